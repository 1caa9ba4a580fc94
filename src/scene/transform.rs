use std::collections::HashMap;

use crate::scene::placement::PlacedImageId;

/// Smallest user zoom on top of cover-fit.
pub const MIN_SCALE: f64 = 0.5;
/// Largest user zoom on top of cover-fit.
pub const MAX_SCALE: f64 = 3.0;

/// Clamp a requested zoom into `[MIN_SCALE, MAX_SCALE]`.
///
/// Infinities clamp to the nearest bound. NaN has no meaningful bound and yields `None`.
pub fn clamp_scale(scale: f64) -> Option<f64> {
    if scale.is_nan() {
        return None;
    }
    Some(scale.clamp(MIN_SCALE, MAX_SCALE))
}

/// Per-image pan/zoom applied on top of the slot's cover-fit placement.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    /// Horizontal offset in canvas pixels from the slot-centered position.
    pub x: f64,
    /// Vertical offset in canvas pixels from the slot-centered position.
    pub y: f64,
    /// Multiplier on the cover-fit size, always within `[MIN_SCALE, MAX_SCALE]`.
    pub scale: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    };
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Partial update merged into a [`Transform`]; `None` fields are left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub scale: Option<f64>,
}

impl TransformPatch {
    pub fn offset(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            scale: None,
        }
    }

    pub fn scale(scale: f64) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.scale.is_none()
    }

    /// Merge into `base`. Non-finite offsets and NaN scales are dropped; scale is clamped.
    pub fn apply_to(self, base: Transform) -> Transform {
        let mut out = base;
        if let Some(x) = self.x.filter(|v| v.is_finite()) {
            out.x = x;
        }
        if let Some(y) = self.y.filter(|v| v.is_finite()) {
            out.y = y;
        }
        if let Some(scale) = self.scale.and_then(clamp_scale) {
            out.scale = scale;
        }
        out
    }
}

/// Receiver of transform updates produced by input handling.
pub trait PositionSink {
    /// Merge `patch` into the transform stored for `id`.
    fn update_position(&mut self, id: PlacedImageId, patch: TransformPatch);
}

/// Per-image transform state keyed by [`PlacedImageId`].
#[derive(Clone, Debug, Default)]
pub struct TransformStore {
    entries: HashMap<PlacedImageId, Transform>,
}

impl TransformStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current transform, or [`Transform::IDENTITY`] for unknown ids.
    pub fn get(&self, id: PlacedImageId) -> Transform {
        self.entries.get(&id).copied().unwrap_or_default()
    }

    pub fn contains(&self, id: PlacedImageId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Merge `patch` into the entry for `id` (creating it from identity) and return the result.
    pub fn update(&mut self, id: PlacedImageId, patch: TransformPatch) -> Transform {
        let entry = self.entries.entry(id).or_default();
        *entry = patch.apply_to(*entry);
        *entry
    }

    /// Drop every entry.
    pub fn reset_all(&mut self) {
        self.entries.clear();
    }

    /// Give each id an identity transform.
    pub fn seed(&mut self, ids: impl IntoIterator<Item = PlacedImageId>) {
        for id in ids {
            self.entries.insert(id, Transform::IDENTITY);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PositionSink for TransformStore {
    fn update_position(&mut self, id: PlacedImageId, patch: TransformPatch) {
        self.update(id, patch);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/transform.rs"]
mod tests;
