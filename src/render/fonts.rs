//! Font used for chart titles, axis labels and legends.
//!
//! DejaVu Sans is compiled into the crate and is the default, so labels and
//! placeholder captions are drawn on any machine. [`Typeface::none`] turns
//! text off; layout never depends on whether a font is loaded, as
//! [`Typeface::measure`] falls back to an estimate.

use std::path::Path;

use ab_glyph::{FontArc, FontRef, FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use super::RenderError;

/// Sans-serif fonts commonly present on Linux, macOS and Windows.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Average advance of a glyph relative to the pixel size, used when no
/// font is loaded.
const ESTIMATED_ADVANCE: f32 = 0.5;

#[derive(Clone)]
pub struct Typeface {
    font: Option<FontArc>,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface")
            .field("loaded", &self.font.is_some())
            .finish()
    }
}

impl Default for Typeface {
    fn default() -> Self {
        Self::bundled()
    }
}

impl Typeface {
    /// DejaVu Sans, shipped with the crate.
    pub fn bundled() -> Self {
        match FontRef::try_from_slice(BUNDLED_FONT) {
            Ok(font) => Self {
                font: Some(FontArc::new(font)),
            },
            Err(e) => {
                log::warn!("bundled font unusable, charts are drawn without labels: {}", e);
                Self::none()
            },
        }
    }

    /// No font: geometry only.
    pub fn none() -> Self {
        Self { font: None }
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RenderError> {
        Self::from_bytes_and_index(data, 0)
    }

    pub fn from_bytes_and_index(data: Vec<u8>, index: u32) -> Result<Self, RenderError> {
        let font = FontVec::try_from_vec_and_index(data, index)
            .map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self {
            font: Some(FontArc::new(font)),
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }

    /// Look for a sans-serif font on this machine, falling back to the
    /// bundled one.
    pub fn discover() -> Self {
        for path in SYSTEM_FONT_PATHS {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(typeface) => {
                        log::debug!("chart labels use {}", path);
                        return typeface;
                    },
                    Err(e) => log::debug!("skipping font {}: {}", path, e),
                }
            }
        }

        if let Some(typeface) = Self::from_system_source() {
            return typeface;
        }

        log::debug!("no system font found; chart labels use the bundled font");
        Self::bundled()
    }

    #[cfg(feature = "fonts")]
    fn from_system_source() -> Option<Self> {
        use font_kit::family_name::FamilyName;
        use font_kit::handle::Handle;
        use font_kit::properties::Properties;
        use font_kit::source::SystemSource;

        let handle = SystemSource::new()
            .select_best_match(&[FamilyName::SansSerif], &Properties::new())
            .ok()?;
        let loaded = match handle {
            Handle::Path { path, font_index } => std::fs::read(&path)
                .map_err(|e| RenderError::Font(e.to_string()))
                .and_then(|data| Self::from_bytes_and_index(data, font_index)),
            Handle::Memory { bytes, font_index } => {
                Self::from_bytes_and_index(bytes.to_vec(), font_index)
            },
        };
        match loaded {
            Ok(typeface) => Some(typeface),
            Err(e) => {
                log::debug!("system sans-serif font unusable: {}", e);
                None
            },
        }
    }

    #[cfg(not(feature = "fonts"))]
    fn from_system_source() -> Option<Self> {
        None
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.font.is_some()
    }

    /// Width and height of `text` at `px` pixels.
    pub fn measure(&self, text: &str, px: f32) -> (u32, u32) {
        match &self.font {
            Some(font) => text_size(PxScale::from(px), font, text),
            None => (
                (text.chars().count() as f32 * px * ESTIMATED_ADVANCE).ceil() as u32,
                px.ceil() as u32,
            ),
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`; a no-op without a
    /// font.
    pub fn draw(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32, px: f32, color: Rgba<u8>) {
        if let Some(font) = &self.font {
            draw_text_mut(canvas, color, x, y, PxScale::from(px), font, text);
        }
    }

    /// Shorten `text` with an ellipsis until it fits in `max_width` pixels.
    pub fn fit(&self, text: &str, px: f32, max_width: u32) -> String {
        if self.measure(text, px).0 <= max_width {
            return text.to_string();
        }
        let mut chars: Vec<char> = text.chars().collect();
        while !chars.is_empty() {
            chars.pop();
            let candidate: String = chars.iter().chain(std::iter::once(&'…')).collect();
            if self.measure(&candidate, px).0 <= max_width {
                return candidate;
            }
        }
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_without_font() {
        let typeface = Typeface::none();
        assert!(!typeface.is_loaded());
        assert_eq!(typeface.measure("abcd", 10.0), (20, 10));
    }

    #[test]
    fn test_fit_shortens() {
        let typeface = Typeface::none();
        assert_eq!(typeface.fit("short", 10.0, 100), "short");
        let fitted = typeface.fit("a much longer label", 10.0, 40);
        assert!(fitted.ends_with('…'));
        assert!(typeface.measure(&fitted, 10.0).0 <= 40);
        assert_eq!(typeface.fit("abc", 10.0, 1), "");
    }

    #[test]
    fn test_draw_without_font_leaves_canvas() {
        let mut canvas = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        let before = canvas.clone();
        Typeface::none().draw(&mut canvas, "x", 1, 1, 12.0, Rgba([0, 0, 0, 255]));
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_bundled_font_is_default() {
        let typeface = Typeface::default();
        assert!(typeface.is_loaded());
        assert!(Typeface::discover().is_loaded());

        let mut canvas = RgbaImage::from_pixel(60, 30, Rgba([255, 255, 255, 255]));
        typeface.draw(&mut canvas, "Ab", 2, 2, 20.0, Rgba([0, 0, 0, 255]));
        assert!(canvas.pixels().any(|p| p.0[0] < 128));
        let (w, h) = typeface.measure("Ab", 20.0);
        assert!(w > 0 && h > 0);
    }

    #[test]
    fn test_invalid_font_bytes() {
        assert!(matches!(
            Typeface::from_bytes(b"not a font".to_vec()),
            Err(RenderError::Font(_))
        ));
    }
}
