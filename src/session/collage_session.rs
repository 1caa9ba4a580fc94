use std::time::{SystemTime, UNIX_EPOCH};

use crate::assets::color::BackgroundColor;
use crate::assets::loader::{ImageLoader, LoadEvent, LoadState};
use crate::config::SessionConfig;
use crate::foundation::error::CollageResult;
use crate::gesture::controller::{GestureContext, GestureController, GestureEffect, GesturePhase};
use crate::gesture::input::{DisplayMapping, InputEvent};
use crate::layout::model::Layout;
use crate::render::compositor::{CompositeScene, CompositorStyle, RenderOutcome, render};
use crate::render::export::{ExportSink, export_file_name};
use crate::render::surface::Surface;
use crate::scene::placement::{ImageSource, PlacedImage, PlacedImageId, PlacedImageIds, arrange};
use crate::scene::transform::{PositionSink, Transform, TransformPatch, TransformStore};

/// One editing session: a layout, the photos bound to it, their pan/zoom, and the composited
/// surface.
///
/// The session is driven from a single thread. Image decoding runs in the background and is
/// folded in by [`CollageSession::poll_loader`] (or [`CollageSession::wait_for_bitmaps`]). Every
/// mutation marks the session dirty; [`CollageSession::render_if_dirty`] repaints at most once
/// per call however many updates arrived in between.
pub struct CollageSession {
    config: SessionConfig,
    style: CompositorStyle,
    layout: Option<Layout>,
    sources: Vec<ImageSource>,
    placed: Vec<PlacedImage>,
    ids: PlacedImageIds,
    transforms: TransformStore,
    loader: ImageLoader,
    controller: GestureController,
    background: BackgroundColor,
    surface: Surface,
    dirty: bool,
}

impl CollageSession {
    pub fn new(config: SessionConfig) -> CollageResult<Self> {
        config.validate()?;
        Ok(Self {
            style: config.compositor_style(),
            layout: None,
            sources: Vec::new(),
            placed: Vec::new(),
            ids: PlacedImageIds::new(),
            transforms: TransformStore::new(),
            loader: ImageLoader::new(config.decode_threads)?,
            controller: GestureController::new(config.wheel_step),
            background: config.background(),
            surface: Surface::new(),
            dirty: false,
            config,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn sources(&self) -> &[ImageSource] {
        &self.sources
    }

    pub fn placed(&self) -> &[PlacedImage] {
        &self.placed
    }

    pub fn background(&self) -> &BackgroundColor {
        &self.background
    }

    pub fn transform(&self, id: PlacedImageId) -> Transform {
        self.transforms.get(id)
    }

    pub fn load_state(&self, id: PlacedImageId) -> Option<&LoadState> {
        self.loader.state(id)
    }

    pub fn pending_decodes(&self) -> usize {
        self.loader.pending_count()
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.controller.phase()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Switch layouts. Sources are kept; they are re-bound to the new slots with fresh ids and
    /// identity transforms.
    pub fn set_layout(&mut self, layout: Layout) {
        tracing::debug!(layout = layout.id(), slots = layout.slot_count(), "layout selected");
        self.layout = Some(layout);
        self.rearrange();
    }

    /// Back to "nothing chosen": the surface becomes a placeholder again.
    pub fn clear_layout(&mut self) {
        self.layout = None;
        self.surface = Surface::new();
        self.rearrange();
    }

    /// Replace the photo list. With a layout active, sources beyond its slot count are dropped.
    pub fn set_sources(&mut self, sources: Vec<ImageSource>) {
        self.sources = sources;
        self.clamp_sources();
        self.rearrange();
    }

    /// Append photos, keeping at most one per slot when a layout is active.
    pub fn add_sources(&mut self, sources: impl IntoIterator<Item = ImageSource>) {
        self.sources.extend(sources);
        self.clamp_sources();
        self.rearrange();
    }

    /// Remove the photo at `index`; later photos move up one slot.
    pub fn remove_source(&mut self, index: usize) -> Option<ImageSource> {
        if index >= self.sources.len() {
            return None;
        }
        let removed = self.sources.remove(index);
        self.rearrange();
        Some(removed)
    }

    pub fn set_background(&mut self, color: impl Into<BackgroundColor>) {
        self.background = color.into();
        self.dirty = true;
    }

    /// Feed one input event through the gesture controller and apply what it decides.
    pub fn handle_input(&mut self, event: &InputEvent, mapping: DisplayMapping) -> GestureEffect {
        let ctx = GestureContext {
            placed: &self.placed,
            mapping,
        };
        let effect = self.controller.handle(event, &ctx, &self.transforms);
        if let GestureEffect::Update { id, patch } = effect {
            self.update_position(id, patch);
        }
        effect
    }

    /// Fold finished decodes into the cache without blocking.
    pub fn poll_loader(&mut self) -> Vec<LoadEvent> {
        let events = self.loader.poll();
        if !events.is_empty() {
            self.dirty = true;
        }
        events
    }

    /// Block until every placed image has decoded or failed.
    pub fn wait_for_bitmaps(&mut self) -> Vec<LoadEvent> {
        let events = self.loader.wait();
        if !events.is_empty() {
            self.dirty = true;
        }
        events
    }

    /// Repaint if anything changed since the last render. Returns `None` when nothing was due.
    pub fn render_if_dirty(&mut self) -> CollageResult<Option<RenderOutcome>> {
        if !self.dirty {
            return Ok(None);
        }
        self.render_now().map(Some)
    }

    /// Repaint unconditionally from current state.
    pub fn render_now(&mut self) -> CollageResult<RenderOutcome> {
        let scene = CompositeScene {
            layout: self.layout.as_ref(),
            placed: &self.placed,
            bitmaps: &self.loader,
            transforms: &self.transforms,
            background: &self.background,
        };
        let outcome = render(&mut self.surface, &scene, &self.style)?;
        self.dirty = false;
        Ok(outcome)
    }

    /// Bring the surface up to date and encode it as PNG.
    pub fn export_png(&mut self) -> CollageResult<Vec<u8>> {
        self.render_if_dirty()?;
        self.surface.encode_png()
    }

    /// Export into `sink` under a `thumbnail-<millis>.png` name, which is returned.
    pub fn export_to(&mut self, sink: &mut dyn ExportSink) -> CollageResult<String> {
        let png = self.export_png()?;
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        let name = export_file_name(millis);
        sink.deliver(&name, &png)?;
        tracing::info!(file = %name, bytes = png.len(), "exported collage");
        Ok(name)
    }

    /// Start over: no layout, no photos, configured default background.
    pub fn reset(&mut self) {
        self.layout = None;
        self.sources.clear();
        self.placed.clear();
        self.transforms.reset_all();
        self.loader.clear();
        self.controller.cancel();
        self.background = self.config.background();
        self.surface = Surface::new();
        self.dirty = false;
        tracing::debug!("session reset");
    }

    fn clamp_sources(&mut self) {
        if let Some(layout) = &self.layout
            && self.sources.len() > layout.slot_count()
        {
            tracing::debug!(
                dropped = self.sources.len() - layout.slot_count(),
                "photo list exceeds slot count"
            );
            self.sources.truncate(layout.slot_count());
        }
    }

    /// Re-bind sources to slots. Every placement gets a new id, so transforms and decodes for
    /// the previous arrangement are discarded.
    fn rearrange(&mut self) {
        self.controller.cancel();
        self.transforms.reset_all();
        self.placed = match &self.layout {
            Some(layout) => arrange(layout, &self.sources, &mut self.ids),
            None => Vec::new(),
        };
        self.transforms.seed(self.placed.iter().map(|p| p.id));
        let scheduled = self.loader.request(&self.placed);
        tracing::debug!(placed = self.placed.len(), scheduled, "arranged");
        self.dirty = true;
    }
}

impl PositionSink for CollageSession {
    /// Updates for ids not in the current arrangement are ignored.
    fn update_position(&mut self, id: PlacedImageId, patch: TransformPatch) {
        if !self.transforms.contains(id) {
            tracing::trace!(%id, "position update for unknown image ignored");
            return;
        }
        let t = self.transforms.update(id, patch);
        tracing::trace!(%id, x = t.x, y = t.y, scale = t.scale, "position updated");
        self.dirty = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/collage_session.rs"]
mod tests;
