use crate::assets::color::BackgroundColor;
use crate::assets::loader::BitmapLookup;
use crate::foundation::core::{Affine, Rect, Rgba8, Size};
use crate::foundation::error::CollageResult;
use crate::layout::model::Layout;
use crate::render::surface::Surface;
use crate::scene::placement::PlacedImage;
use crate::scene::transform::{Transform, TransformStore};

/// Fixed decoration drawn around every placed slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositorStyle {
    /// Border thickness in canvas pixels, drawn inside the slot. `0` disables the border.
    pub border_width: f64,
    pub border_color: Rgba8,
}

impl Default for CompositorStyle {
    fn default() -> Self {
        Self {
            border_width: 2.0,
            border_color: Rgba8::opaque(0xe5, 0xe7, 0xeb),
        }
    }
}

/// Everything one repaint reads.
pub struct CompositeScene<'a> {
    /// `None` means nothing has been chosen yet; rendering is then a no-op.
    pub layout: Option<&'a Layout>,
    pub placed: &'a [PlacedImage],
    pub bitmaps: &'a dyn BitmapLookup,
    pub transforms: &'a TransformStore,
    pub background: &'a BackgroundColor,
}

/// What a render call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// No active layout; the surface was left untouched.
    NoLayout,
    /// Full repaint. `skipped` counts placed images with no bitmap yet (or a failed decode).
    Painted { drawn: usize, skipped: usize },
}

/// Cover-fit size of a `bitmap`-sized image in `slot` before user zoom.
///
/// The result covers the slot on both axes and matches it exactly on at least one.
pub fn cover_fit(bitmap: Size, slot: Rect) -> Size {
    let bitmap_aspect = bitmap.width / bitmap.height;
    let slot_aspect = slot.width() / slot.height();
    if bitmap_aspect > slot_aspect {
        let h = slot.height();
        Size::new(h * bitmap_aspect, h)
    } else {
        let w = slot.width();
        Size::new(w, w / bitmap_aspect)
    }
}

/// Destination rectangle of an image in canvas space: cover-fit, zoomed, centered in the slot,
/// then shifted by the pan offset. May extend past the slot; drawing clips to the slot.
pub fn draw_rect(bitmap: Size, slot: Rect, t: Transform) -> Rect {
    let base = cover_fit(bitmap, slot);
    let w = base.width * t.scale;
    let h = base.height * t.scale;
    let x = slot.x0 + (slot.width() - w) / 2.0 + t.x;
    let y = slot.y0 + (slot.height() - h) / 2.0 + t.y;
    Rect::new(x, y, x + w, y + h)
}

/// Repaint `surface` from scratch.
///
/// Resizes (and so clears) the surface to the layout canvas, fills the background, draws each
/// placed image whose bitmap is ready clipped to its slot, and borders every placed slot.
/// Placed images without a bitmap leave the background showing.
#[tracing::instrument(skip_all, fields(placed = scene.placed.len()))]
pub fn render(
    surface: &mut Surface,
    scene: &CompositeScene<'_>,
    style: &CompositorStyle,
) -> CollageResult<RenderOutcome> {
    let Some(layout) = scene.layout else {
        tracing::debug!("no active layout; nothing to draw");
        return Ok(RenderOutcome::NoLayout);
    };

    let canvas = layout.canvas();
    if !scene.background.is_valid() {
        tracing::warn!(color = %scene.background, "unparseable background color; painting black");
    }

    let pixmap = surface.reset(canvas)?;
    let mut ctx = vello_cpu::RenderContext::new(pixmap.width(), pixmap.height());

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(scene.background.resolved()));
    ctx.fill_rect(&rect_to_cpu(canvas.rect()));

    let mut drawn = 0;
    let mut skipped = 0;
    for placed in scene.placed {
        match scene.bitmaps.bitmap(placed.id) {
            Some(bitmap) => {
                let size = Size::new(f64::from(bitmap.width()), f64::from(bitmap.height()));
                let dest = draw_rect(size, placed.rect, scene.transforms.get(placed.id));
                let clip = placed.rect.intersect(dest);
                if clip.area() > 0.0 {
                    // Map image pixels onto `dest`, then fill only the part inside the slot.
                    let to_canvas = Affine::translate((dest.x0, dest.y0))
                        * Affine::scale_non_uniform(
                            dest.width() / size.width,
                            dest.height() / size.height,
                        );
                    let clip_in_image = to_canvas.inverse().transform_rect_bbox(clip);

                    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_transform(affine_to_cpu(to_canvas));
                    ctx.set_paint(bitmap.paint());
                    ctx.fill_rect(&rect_to_cpu(clip_in_image));
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                }
                drawn += 1;
            }
            None => skipped += 1,
        }
        draw_border(&mut ctx, placed.rect, style);
    }

    ctx.flush();
    ctx.render_to_pixmap(pixmap);

    tracing::debug!(
        layout = layout.id(),
        drawn,
        skipped,
        "repainted {}x{}",
        canvas.width,
        canvas.height
    );
    Ok(RenderOutcome::Painted { drawn, skipped })
}

/// Inset frame of `style.border_width` inside `slot`, so nothing leaves the slot.
fn draw_border(ctx: &mut vello_cpu::RenderContext, slot: Rect, style: &CompositorStyle) {
    let bw = style
        .border_width
        .min(slot.width() / 2.0)
        .min(slot.height() / 2.0);
    if bw.is_nan() || bw <= 0.0 {
        return;
    }

    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(style.border_color));
    let Rect { x0, y0, x1, y1 } = slot;
    for edge in [
        Rect::new(x0, y0, x1, y0 + bw),
        Rect::new(x0, y1 - bw, x1, y1),
        Rect::new(x0, y0 + bw, x0 + bw, y1 - bw),
        Rect::new(x1 - bw, y0 + bw, x1, y1 - bw),
    ] {
        ctx.fill_rect(&rect_to_cpu(edge));
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
