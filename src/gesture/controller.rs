use crate::foundation::core::{Point, Vec2};
use crate::gesture::input::{DisplayMapping, InputEvent, PointerButton};
use crate::scene::placement::{PlacedImage, PlacedImageId, hit_test};
use crate::scene::transform::{TransformPatch, TransformStore, clamp_scale};

/// Default zoom change per wheel step.
pub const DEFAULT_WHEEL_STEP: f64 = 0.1;

/// Two touches closer than this cannot define a pinch ratio.
const MIN_PINCH_DISTANCE: f64 = 1e-6;

/// What the controller needs to know about the scene for one event.
#[derive(Clone, Copy, Debug)]
pub struct GestureContext<'a> {
    pub placed: &'a [PlacedImage],
    pub mapping: DisplayMapping,
}

/// Result of feeding one event to the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEffect {
    None,
    /// Merge `patch` into the transform of `id`.
    Update {
        id: PlacedImageId,
        patch: TransformPatch,
    },
}

/// Externally visible controller state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
    Pinching,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragSource {
    Mouse,
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DragSession {
    id: PlacedImageId,
    source: DragSource,
    /// Screen position where the drag began.
    start: Point,
    /// Offset of the image when the drag began.
    initial: Vec2,
    /// Canvas pixels per screen pixel, captured at drag start.
    scale: Vec2,
}

impl DragSession {
    fn offset_at(&self, position: Point) -> TransformPatch {
        let delta = position - self.start;
        TransformPatch::offset(
            self.initial.x + delta.x * self.scale.x,
            self.initial.y + delta.y * self.scale.y,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PinchSession {
    id: PlacedImageId,
    initial_distance: f64,
    initial_scale: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Session {
    Idle,
    Drag(DragSession),
    Pinch(PinchSession),
}

/// Turns pointer, touch and wheel input into transform updates.
///
/// At most one drag or pinch session exists at a time. Mouse and touch are mutually exclusive:
/// while a session from one source is active, session-starting events from the other are
/// ignored. Wheel zoom needs no session.
#[derive(Clone, Debug)]
pub struct GestureController {
    session: Session,
    wheel_step: f64,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(DEFAULT_WHEEL_STEP)
    }
}

impl GestureController {
    pub fn new(wheel_step: f64) -> Self {
        Self {
            session: Session::Idle,
            wheel_step,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        match self.session {
            Session::Idle => GesturePhase::Idle,
            Session::Drag(_) => GesturePhase::Dragging,
            Session::Pinch(_) => GesturePhase::Pinching,
        }
    }

    /// Image the active session is manipulating.
    pub fn active_target(&self) -> Option<PlacedImageId> {
        match self.session {
            Session::Idle => None,
            Session::Drag(d) => Some(d.id),
            Session::Pinch(p) => Some(p.id),
        }
    }

    /// Abandon any session without emitting an update.
    pub fn cancel(&mut self) {
        if self.session != Session::Idle {
            tracing::trace!(phase = ?self.phase(), "gesture cancelled");
        }
        self.session = Session::Idle;
    }

    pub fn handle(
        &mut self,
        event: &InputEvent,
        ctx: &GestureContext<'_>,
        transforms: &TransformStore,
    ) -> GestureEffect {
        match event {
            InputEvent::PointerDown { position, button } => {
                if *button != PointerButton::Primary || self.touch_active() {
                    return GestureEffect::None;
                }
                if let Some(id) = hit_test(ctx.placed, ctx.mapping.to_canvas(*position)) {
                    self.start_drag(id, DragSource::Mouse, *position, ctx, transforms);
                }
                GestureEffect::None
            }
            InputEvent::PointerMove { position } => match self.session {
                Session::Drag(d) if d.source == DragSource::Mouse => GestureEffect::Update {
                    id: d.id,
                    patch: d.offset_at(*position),
                },
                _ => GestureEffect::None,
            },
            InputEvent::PointerUp { .. } | InputEvent::PointerCancel => {
                if self.mouse_active() {
                    self.cancel();
                }
                GestureEffect::None
            }
            InputEvent::TouchStart { touches } => {
                if self.mouse_active() {
                    return GestureEffect::None;
                }
                self.touch_start(touches, ctx, transforms);
                GestureEffect::None
            }
            InputEvent::TouchMove { touches } => match (self.session, touches.as_slice()) {
                (Session::Drag(d), [only]) if d.source == DragSource::Touch => {
                    GestureEffect::Update {
                        id: d.id,
                        patch: d.offset_at(*only),
                    }
                }
                (Session::Pinch(p), [a, b]) => {
                    let ratio = a.distance(*b) / p.initial_distance;
                    match clamp_scale(p.initial_scale * ratio) {
                        Some(scale) => GestureEffect::Update {
                            id: p.id,
                            patch: TransformPatch::scale(scale),
                        },
                        None => GestureEffect::None,
                    }
                }
                _ => GestureEffect::None,
            },
            InputEvent::TouchEnd { touches } => {
                let ends = match self.session {
                    Session::Pinch(_) => touches.len() < 2,
                    Session::Drag(d) => d.source == DragSource::Touch && touches.is_empty(),
                    Session::Idle => false,
                };
                if ends {
                    self.cancel();
                }
                GestureEffect::None
            }
            InputEvent::TouchCancel => {
                if self.touch_active() {
                    self.cancel();
                }
                GestureEffect::None
            }
            InputEvent::Wheel { position, delta_y } => {
                self.wheel(*position, *delta_y, ctx, transforms)
            }
        }
    }

    fn mouse_active(&self) -> bool {
        matches!(self.session, Session::Drag(d) if d.source == DragSource::Mouse)
    }

    fn touch_active(&self) -> bool {
        match self.session {
            Session::Drag(d) => d.source == DragSource::Touch,
            Session::Pinch(_) => true,
            Session::Idle => false,
        }
    }

    fn start_drag(
        &mut self,
        id: PlacedImageId,
        source: DragSource,
        start: Point,
        ctx: &GestureContext<'_>,
        transforms: &TransformStore,
    ) {
        let t = transforms.get(id);
        self.session = Session::Drag(DragSession {
            id,
            source,
            start,
            initial: Vec2::new(t.x, t.y),
            scale: ctx.mapping.scale_factors(),
        });
        tracing::trace!(%id, ?source, "drag started");
    }

    fn touch_start(
        &mut self,
        touches: &[Point],
        ctx: &GestureContext<'_>,
        transforms: &TransformStore,
    ) {
        match touches {
            [only] => {
                if let Some(id) = hit_test(ctx.placed, ctx.mapping.to_canvas(*only)) {
                    self.start_drag(id, DragSource::Touch, *only, ctx, transforms);
                }
            }
            [a, b] => {
                let target = self
                    .active_target()
                    .or_else(|| hit_test(ctx.placed, ctx.mapping.to_canvas(*a)));
                let Some(id) = target else {
                    return;
                };
                let initial_distance = a.distance(*b);
                if !(initial_distance.is_finite() && initial_distance > MIN_PINCH_DISTANCE) {
                    self.cancel();
                    return;
                }
                self.session = Session::Pinch(PinchSession {
                    id,
                    initial_distance,
                    initial_scale: transforms.get(id).scale,
                });
                tracing::trace!(%id, initial_distance, "pinch started");
            }
            _ => {}
        }
    }

    fn wheel(
        &self,
        position: Point,
        delta_y: f64,
        ctx: &GestureContext<'_>,
        transforms: &TransformStore,
    ) -> GestureEffect {
        if delta_y == 0.0 || delta_y.is_nan() {
            return GestureEffect::None;
        }
        let Some(id) = hit_test(ctx.placed, ctx.mapping.to_canvas(position)) else {
            return GestureEffect::None;
        };
        let step = if delta_y > 0.0 {
            -self.wheel_step
        } else {
            self.wheel_step
        };
        match clamp_scale(transforms.get(id).scale + step) {
            Some(scale) => GestureEffect::Update {
                id,
                patch: TransformPatch::scale(scale),
            },
            None => GestureEffect::None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gesture/controller.rs"]
mod tests;
