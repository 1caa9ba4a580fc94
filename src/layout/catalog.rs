use std::collections::HashSet;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{CollageError, CollageResult};
use crate::layout::model::Layout;

const STOCK_EDGE: u32 = 1080;

/// Ordered, id-addressable set of layouts.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutCatalog {
    layouts: Vec<Layout>,
}

impl LayoutCatalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(layouts: Vec<Layout>) -> CollageResult<Self> {
        let mut seen = HashSet::new();
        for layout in &layouts {
            if !seen.insert(layout.id()) {
                return Err(CollageError::validation(format!(
                    "duplicate layout id '{}'",
                    layout.id()
                )));
            }
        }
        Ok(Self { layouts })
    }

    /// The stock 1080x1080 layouts.
    pub fn builtin() -> Self {
        let specs: [(&str, &str, Vec<Rect>); 9] = [
            ("single", "1 photo", grid(1, 1)),
            ("two-horizontal", "2 photos, side by side", grid(2, 1)),
            ("two-vertical", "2 photos, stacked", grid(1, 2)),
            ("three-horizontal", "3 photos, side by side", grid(3, 1)),
            ("three-vertical", "3 photos, stacked", grid(1, 3)),
            ("three-grid", "3 photos, grid", three_grid()),
            ("four-grid", "4 photo grid", grid(2, 2)),
            ("six-grid", "6 photo grid", grid(3, 2)),
            ("nine-grid", "9 photo grid", grid(3, 3)),
        ];

        let layouts = specs
            .into_iter()
            .filter_map(|(id, name, slots)| {
                Layout::new(id, name, Canvas::new(STOCK_EDGE, STOCK_EDGE), slots).ok()
            })
            .collect();
        Self { layouts }
    }

    /// Parse a JSON array of catalog entries.
    pub fn from_json_str(json: &str) -> CollageResult<Self> {
        let layouts: Vec<Layout> = serde_json::from_str(json)?;
        Self::new(layouts)
    }

    pub fn load(path: impl AsRef<Path>) -> CollageResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read layout catalog '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn get(&self, id: &str) -> Option<&Layout> {
        self.layouts.iter().find(|l| l.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layout> {
        self.layouts.iter()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

impl Default for LayoutCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Row-major `cols x rows` grid of equal cells over the stock canvas.
fn grid(cols: u32, rows: u32) -> Vec<Rect> {
    let cw = f64::from(STOCK_EDGE / cols);
    let ch = f64::from(STOCK_EDGE / rows);
    let mut out = Vec::with_capacity((cols * rows) as usize);
    for r in 0..rows {
        for c in 0..cols {
            let x = f64::from(c) * cw;
            let y = f64::from(r) * ch;
            out.push(Rect::new(x, y, x + cw, y + ch));
        }
    }
    out
}

/// One tall cell on the left, two stacked cells on the right.
fn three_grid() -> Vec<Rect> {
    let edge = f64::from(STOCK_EDGE);
    let half = edge / 2.0;
    vec![
        Rect::new(0.0, 0.0, half, edge),
        Rect::new(half, 0.0, edge, half),
        Rect::new(half, half, edge, edge),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/layout/catalog.rs"]
mod tests;
