//! Collage is a photo-collage composition engine.
//!
//! Pick a fixed [`Layout`] of rectangular slots on a square canvas, bind photos to the slots in
//! order, pan and zoom each photo inside its slot, and export the composite as PNG:
//!
//! - Choose a layout from a [`LayoutCatalog`]
//! - Drive a [`CollageSession`] with photos, background colour and [`InputEvent`]s
//! - Render to a [`Surface`] and hand the PNG to an [`ExportSink`]
//!
//! Decoding runs on a background pool; everything else is synchronous on the caller's thread.
#![forbid(unsafe_code)]

mod assets;
mod config;
mod foundation;
mod gesture;
mod layout;
mod render;
mod scene;
mod session;

pub use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8, Size, Vec2};
pub use crate::foundation::error::{CollageError, CollageResult};

pub use crate::assets::color::{BackgroundColor, PRESET_BACKGROUNDS, parse_hex_rgb};
pub use crate::assets::decode::{Bitmap, decode_image};
pub use crate::assets::loader::{BitmapHandle, BitmapLookup, ImageLoader, LoadEvent, LoadState};
pub use crate::config::{ENV_DECODE_THREADS, ENV_WHEEL_STEP, SessionConfig};
pub use crate::gesture::controller::{
    DEFAULT_WHEEL_STEP, GestureContext, GestureController, GestureEffect, GesturePhase,
};
pub use crate::gesture::input::{DisplayMapping, InputEvent, PointerButton};
pub use crate::layout::catalog::LayoutCatalog;
pub use crate::layout::model::{Layout, MAX_CANVAS_EDGE, SlotRect};
pub use crate::render::compositor::{
    CompositeScene, CompositorStyle, RenderOutcome, cover_fit, draw_rect, render,
};
pub use crate::render::export::{
    ExportSink, FileExportSink, InMemoryExportSink, export_file_name,
};
pub use crate::render::surface::Surface;
pub use crate::scene::placement::{
    ImageSource, PlacedImage, PlacedImageId, PlacedImageIds, arrange, hit_test,
};
pub use crate::scene::transform::{
    MAX_SCALE, MIN_SCALE, PositionSink, Transform, TransformPatch, TransformStore, clamp_scale,
};
pub use crate::session::collage_session::CollageSession;
