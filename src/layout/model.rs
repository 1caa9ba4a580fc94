use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{CollageError, CollageResult};

/// Largest canvas edge the CPU rasteriser can address.
pub const MAX_CANVAS_EDGE: u32 = u16::MAX as u32;

/// Slot rectangle in canvas pixel coordinates, in the catalog's `{x, y, width, height}` shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SlotRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn from_rect(r: Rect) -> Self {
        Self::new(r.x0, r.y0, r.width(), r.height())
    }
}

/// A named arrangement of non-overlapping slots over a fixed canvas.
///
/// Layouts are immutable once built; construction always goes through [`Layout::new`], which
/// validates the geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayoutDef", into = "LayoutDef")]
pub struct Layout {
    id: String,
    name: String,
    canvas: Canvas,
    slots: Vec<Rect>,
}

impl Layout {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        canvas: Canvas,
        slots: Vec<Rect>,
    ) -> CollageResult<Self> {
        let layout = Self {
            id: id.into(),
            name: name.into(),
            canvas,
            slots,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn canvas_width(&self) -> u32 {
        self.canvas.width
    }

    pub fn canvas_height(&self) -> u32 {
        self.canvas.height
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slots in catalog order; slot `i` receives the `i`-th arranged image.
    pub fn slots(&self) -> &[Rect] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<Rect> {
        self.slots.get(index).copied()
    }

    /// Check the catalog invariants: a non-empty addressable canvas, at least one slot, and
    /// slots that are positive-sized, inside the canvas, and pairwise disjoint.
    pub fn validate(&self) -> CollageResult<()> {
        if self.id.trim().is_empty() {
            return Err(CollageError::validation("layout id must be non-empty"));
        }
        if self.canvas.is_empty() {
            return Err(CollageError::validation(format!(
                "layout '{}' canvas must be non-empty",
                self.id
            )));
        }
        if self.canvas.width > MAX_CANVAS_EDGE || self.canvas.height > MAX_CANVAS_EDGE {
            return Err(CollageError::validation(format!(
                "layout '{}' canvas exceeds {MAX_CANVAS_EDGE}px",
                self.id
            )));
        }
        if self.slots.is_empty() {
            return Err(CollageError::validation(format!(
                "layout '{}' must define at least one slot",
                self.id
            )));
        }

        let bounds = self.canvas.rect();
        for (i, slot) in self.slots.iter().enumerate() {
            let finite = [slot.x0, slot.y0, slot.x1, slot.y1]
                .iter()
                .all(|v| v.is_finite());
            if !finite || slot.width() <= 0.0 || slot.height() <= 0.0 {
                return Err(CollageError::validation(format!(
                    "layout '{}' slot {i} must have a finite positive size",
                    self.id
                )));
            }
            if slot.x0 < bounds.x0
                || slot.y0 < bounds.y0
                || slot.x1 > bounds.x1
                || slot.y1 > bounds.y1
            {
                return Err(CollageError::validation(format!(
                    "layout '{}' slot {i} lies outside the canvas",
                    self.id
                )));
            }
            for (j, other) in self.slots.iter().enumerate().skip(i + 1) {
                if slot.intersect(*other).area() > 0.0 {
                    return Err(CollageError::validation(format!(
                        "layout '{}' slots {i} and {j} overlap",
                        self.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Serialized catalog entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct LayoutDef {
    id: String,
    name: String,
    slots: usize,
    canvas_width: u32,
    canvas_height: u32,
    positions: Vec<SlotRect>,
}

impl TryFrom<LayoutDef> for Layout {
    type Error = CollageError;

    fn try_from(def: LayoutDef) -> Result<Self, Self::Error> {
        if def.slots != def.positions.len() {
            return Err(CollageError::validation(format!(
                "layout '{}' declares {} slots but lists {} positions",
                def.id,
                def.slots,
                def.positions.len()
            )));
        }
        Layout::new(
            def.id,
            def.name,
            Canvas::new(def.canvas_width, def.canvas_height),
            def.positions.into_iter().map(SlotRect::to_rect).collect(),
        )
    }
}

impl From<Layout> for LayoutDef {
    fn from(layout: Layout) -> Self {
        Self {
            slots: layout.slots.len(),
            canvas_width: layout.canvas.width,
            canvas_height: layout.canvas.height,
            positions: layout.slots.into_iter().map(SlotRect::from_rect).collect(),
            id: layout.id,
            name: layout.name,
        }
    }
}
