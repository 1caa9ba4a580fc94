use std::io::Cursor;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Rgba8, unpremultiply_rgba8_in_place};
use crate::foundation::error::{CollageError, CollageResult};

/// The composited raster: a premultiplied RGBA8 pixmap sized to the active layout's canvas.
///
/// A fresh surface is a placeholder with no pixels until the first successful render.
#[derive(Default)]
pub struct Surface {
    canvas: Option<Canvas>,
    pixmap: Option<vello_cpu::Pixmap>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` until something has been rendered.
    pub fn is_placeholder(&self) -> bool {
        self.pixmap.is_none()
    }

    pub fn canvas(&self) -> Option<Canvas> {
        self.canvas
    }

    pub fn width(&self) -> u32 {
        self.canvas.map_or(0, |c| c.width)
    }

    pub fn height(&self) -> u32 {
        self.canvas.map_or(0, |c| c.height)
    }

    /// Size the pixmap to `canvas` and clear it to transparent.
    pub(crate) fn reset(&mut self, canvas: Canvas) -> CollageResult<&mut vello_cpu::Pixmap> {
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| CollageError::validation("surface width exceeds u16"))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| CollageError::validation("surface height exceeds u16"))?;

        let pixmap = match self.pixmap.take() {
            Some(mut p) if p.width() == w && p.height() == h => {
                p.data_as_u8_slice_mut().fill(0);
                p
            }
            _ => vello_cpu::Pixmap::new(w, h),
        };
        self.canvas = Some(canvas);
        Ok(self.pixmap.insert(pixmap))
    }

    /// Premultiplied RGBA8 bytes, row-major; empty for a placeholder.
    pub fn data(&self) -> &[u8] {
        match &self.pixmap {
            Some(p) => p.data_as_u8_slice(),
            None => &[],
        }
    }

    /// Straight-alpha color at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = (y as usize * self.width() as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(self.data().get(i..i + 4)?);
        unpremultiply_rgba8_in_place(&mut px);
        Some(Rgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Copy out as a straight-alpha image.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        if self.is_placeholder() {
            return None;
        }
        let mut data = self.data().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        image::RgbaImage::from_raw(self.width(), self.height(), data)
    }

    /// Serialize the last completed repaint as PNG.
    #[tracing::instrument(skip(self), fields(width = self.width(), height = self.height()))]
    pub fn encode_png(&self) -> CollageResult<Vec<u8>> {
        let img = self
            .to_rgba_image()
            .ok_or_else(|| CollageError::export("surface has not been rendered"))?;

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode surface as png")
            .map_err(|e| CollageError::export(format!("{e:#}")))?;
        Ok(buf)
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("canvas", &self.canvas)
            .field("placeholder", &self.is_placeholder())
            .finish()
    }
}
