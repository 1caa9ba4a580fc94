use crate::foundation::core::{Canvas, Point, Size, Vec2};

/// Mouse buttons; only [`PointerButton::Primary`] starts a drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Raw input in screen coordinates, as delivered by the host's event loop.
///
/// Touch events carry the full list of touches still on the surface after the event, the way
/// browser and winit-style touch APIs report them.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown {
        position: Point,
        button: PointerButton,
    },
    PointerMove {
        position: Point,
    },
    PointerUp {
        position: Point,
    },
    /// The tracked pointer is gone (left the window, capture lost, ...).
    PointerCancel,
    TouchStart {
        touches: Vec<Point>,
    },
    TouchMove {
        touches: Vec<Point>,
    },
    TouchEnd {
        touches: Vec<Point>,
    },
    TouchCancel,
    /// One discrete scroll step; positive `delta_y` scrolls down.
    Wheel {
        position: Point,
        delta_y: f64,
    },
}

/// How the canvas is currently shown on screen.
///
/// The surface is displayed scaled (e.g. fitted to a window), so screen deltas must be scaled by
/// `canvas / displayed` before they become canvas-pixel offsets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayMapping {
    /// Screen position of the canvas' top-left corner.
    pub origin: Point,
    /// On-screen size of the whole canvas.
    pub displayed: Size,
    pub canvas: Canvas,
}

impl DisplayMapping {
    pub fn new(origin: Point, displayed: Size, canvas: Canvas) -> Self {
        Self {
            origin,
            displayed,
            canvas,
        }
    }

    /// Canvas shown 1:1 at the screen origin.
    pub fn identity(canvas: Canvas) -> Self {
        Self::new(Point::ORIGIN, canvas.size(), canvas)
    }

    /// Canvas pixels per screen pixel on each axis.
    ///
    /// A degenerate displayed size maps 1:1 rather than dividing by zero.
    pub fn scale_factors(&self) -> Vec2 {
        let axis = |canvas: u32, shown: f64| {
            if shown.is_finite() && shown > 0.0 {
                f64::from(canvas) / shown
            } else {
                1.0
            }
        };
        Vec2::new(
            axis(self.canvas.width, self.displayed.width),
            axis(self.canvas.height, self.displayed.height),
        )
    }

    pub fn to_canvas(&self, screen: Point) -> Point {
        let s = self.scale_factors();
        Point::new(
            (screen.x - self.origin.x) * s.x,
            (screen.y - self.origin.y) * s.y,
        )
    }
}
