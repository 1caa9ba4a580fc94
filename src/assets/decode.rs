use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::premultiply_rgba8_in_place;
use crate::foundation::error::{CollageError, CollageResult};
use crate::scene::placement::ImageSource;

/// Decoded image ready for compositing.
///
/// Pixels are premultiplied RGBA8 held in a `vello_cpu` pixmap, shared so that every repaint
/// reuses the same decode.
#[derive(Clone)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl Bitmap {
    /// Build from straight-alpha RGBA8 pixels, row-major and tightly packed.
    pub fn from_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> CollageResult<Self> {
        premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul_rgba8(width, height, &rgba8)
    }

    pub(crate) fn from_premul_rgba8(
        width: u32,
        height: u32,
        rgba8_premul: &[u8],
    ) -> CollageResult<Self> {
        if width == 0 || height == 0 {
            return Err(CollageError::decode("image has zero width or height"));
        }
        let w: u16 = width
            .try_into()
            .map_err(|_| CollageError::decode("image width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| CollageError::decode("image height exceeds u16"))?;
        if rgba8_premul.len() != width as usize * height as usize * 4 {
            return Err(CollageError::decode("image byte length mismatch"));
        }

        let mut may_have_opacities = false;
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for px in rgba8_premul.chunks_exact(4) {
            let a = px[3];
            may_have_opacities |= a != 255;
            pixels.push(vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a,
            });
        }

        Ok(Self {
            width,
            height,
            pixmap: Arc::new(vello_cpu::Pixmap::from_parts_with_opacity(
                pixels,
                w,
                h,
                may_have_opacities,
            )),
        })
    }

    /// Natural width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Natural height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(self.pixmap.clone()),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Decode encoded image bytes (any format the `image` crate was built with).
pub fn decode_image(bytes: &[u8]) -> CollageResult<Bitmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Bitmap::from_rgba8(width, height, rgba.into_raw())
}

/// Resolve and decode one source.
pub(crate) fn decode_source(source: &ImageSource) -> CollageResult<Bitmap> {
    match source {
        ImageSource::Bytes(bytes) => decode_image(bytes),
        ImageSource::Path(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("read image '{}'", path.display()))?;
            decode_image(&bytes)
        }
    }
}
