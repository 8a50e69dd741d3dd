use image::RgbaImage;

use crate::common::Size;
use crate::common::unit::{DEFAULT_DPI, px_to_pt};

/// An RGBA raster ready for placement on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pixels: RgbaImage,
    description: String,
}

impl RenderedImage {
    pub fn new(pixels: RgbaImage, description: impl Into<String>) -> Self {
        Self {
            pixels,
            description: description.into(),
        }
    }

    /// Decode an embedded picture (PNG, JPEG, GIF, BMP or TIFF).
    pub fn decode(data: &[u8], description: impl Into<String>) -> image::ImageResult<Self> {
        let pixels = image::load_from_memory(data)?.to_rgba8();
        Ok(Self::new(pixels, description))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[inline]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Plain-text alternative for the image.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Size in points when shown at the default screen density.
    pub fn natural_size(&self) -> Size {
        Size::new(
            px_to_pt(self.width(), DEFAULT_DPI),
            px_to_pt(self.height(), DEFAULT_DPI),
        )
    }
}
