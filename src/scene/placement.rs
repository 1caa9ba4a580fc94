use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::core::{Point, Rect};
use crate::layout::model::Layout;

/// Session-unique identity of one placed image.
///
/// Ids are never reused within a session: re-arranging (new layout or new source list) always
/// mints fresh ids, so state keyed by an old id cannot leak into the new arrangement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlacedImageId(pub u64);

impl fmt::Display for PlacedImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "img-{}", self.0)
    }
}

/// Monotonic [`PlacedImageId`] allocator.
#[derive(Debug, Default)]
pub struct PlacedImageIds {
    next: u64,
}

impl PlacedImageIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> PlacedImageId {
        let id = PlacedImageId(self.next);
        self.next += 1;
        id
    }
}

/// Opaque reference to encoded image bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded bytes already in memory.
    Bytes(Arc<[u8]>),
    /// A file read at decode time.
    Path(PathBuf),
}

impl ImageSource {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }
}

/// One source image bound to one layout slot.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedImage {
    pub id: PlacedImageId,
    pub source: ImageSource,
    pub slot_index: usize,
    /// Copy of the slot rectangle in canvas pixels.
    pub rect: Rect,
}

/// Bind sources to slots in order: source `i` lands in slot `i`.
///
/// Sources beyond the layout's slot count are dropped.
#[tracing::instrument(skip_all, fields(layout = layout.id(), sources = sources.len()))]
pub fn arrange(
    layout: &Layout,
    sources: &[ImageSource],
    ids: &mut PlacedImageIds,
) -> Vec<PlacedImage> {
    if sources.len() > layout.slot_count() {
        tracing::debug!(
            dropped = sources.len() - layout.slot_count(),
            "more sources than slots"
        );
    }

    layout
        .slots()
        .iter()
        .zip(sources)
        .enumerate()
        .map(|(slot_index, (rect, source))| PlacedImage {
            id: ids.next_id(),
            source: source.clone(),
            slot_index,
            rect: *rect,
        })
        .collect()
}

/// Topmost placed image whose slot contains `canvas_point`.
///
/// Slot rectangles are half-open (`[x0, x1) x [y0, y1)`) so a point on a shared edge belongs
/// to exactly one slot.
pub fn hit_test(placed: &[PlacedImage], canvas_point: Point) -> Option<PlacedImageId> {
    placed
        .iter()
        .rev()
        .find(|p| {
            let r = p.rect;
            canvas_point.x >= r.x0
                && canvas_point.x < r.x1
                && canvas_point.y >= r.y0
                && canvas_point.y < r.y1
        })
        .map(|p| p.id)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/placement.rs"]
mod tests;
