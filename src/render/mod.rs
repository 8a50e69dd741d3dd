//! Chart rasterization.
//!
//! [`ChartRenderer::render`] turns a [`ChartModel`] into pixels and never
//! fails: when the model has nothing to plot, or the backend reports an
//! error, a deterministic placeholder is drawn instead.
//!
//! ```
//! use longan::document::{ChartKind, ChartModel, Series};
//! use longan::render::{ChartRenderer, Typeface};
//!
//! let model = ChartModel {
//!     title: "Sales".to_string(),
//!     kind: ChartKind::Bar,
//!     series: vec![Series::new(
//!         "S1",
//!         vec!["A".into(), "B".into(), "C".into()],
//!         vec![1.0, 4.0, 3.0],
//!     )],
//! };
//! let renderer = ChartRenderer::new(Typeface::none());
//! let image = renderer.render(&model, 400, 300);
//! assert_eq!((image.width(), image.height()), (400, 300));
//! ```

pub mod fallback;
pub mod fonts;
pub mod raster;

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::document::{ChartKind, ChartModel, RenderedImage};

pub use fonts::Typeface;
pub use raster::RasterBackend;

/// Largest canvas edge in pixels; requested sizes are clamped to `1..=MAX_CANVAS`.
pub const MAX_CANVAS: u32 = 4096;

pub(crate) const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Reasons a chart could not be plotted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("unsupported chart type: {0}")]
    UnsupportedKind(ChartKind),

    #[error("no chart data")]
    NoData,

    #[error("canvas {width}x{height} too small for plotting")]
    CanvasTooSmall { width: u32, height: u32 },

    #[error("font error: {0}")]
    Font(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// A plotting backend drawing a whole chart onto a white canvas.
pub trait ChartBackend: Send + Sync {
    fn plot(&self, model: &ChartModel, canvas: &mut RgbaImage, typeface: &Typeface) -> Result<(), RenderError>;
}

/// Outcome of [`ChartRenderer::render_checked`].
#[derive(Debug, Clone)]
pub struct Rendering {
    pub image: RenderedImage,
    /// Set when the placeholder was drawn instead of the chart.
    pub fallback: Option<RenderError>,
}

impl Rendering {
    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

pub struct ChartRenderer {
    backend: Box<dyn ChartBackend>,
    typeface: Typeface,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(Typeface::default())
    }
}

impl std::fmt::Debug for ChartRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartRenderer")
            .field("typeface", &self.typeface)
            .finish_non_exhaustive()
    }
}

impl ChartRenderer {
    pub fn new(typeface: Typeface) -> Self {
        Self {
            backend: Box::new(RasterBackend::default()),
            typeface,
        }
    }

    pub fn with_backend(mut self, backend: impl ChartBackend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    #[inline]
    pub fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    /// Render `model` into a `width` x `height` raster.
    pub fn render(&self, model: &ChartModel, width: u32, height: u32) -> RenderedImage {
        self.render_checked(model, width, height).image
    }

    /// Like [`render`](Self::render), also telling whether the placeholder
    /// was used and why.
    pub fn render_checked(&self, model: &ChartModel, width: u32, height: u32) -> Rendering {
        let width = width.clamp(1, MAX_CANVAS);
        let height = height.clamp(1, MAX_CANVAS);

        let plotted = Self::precheck(model).and_then(|()| {
            let mut canvas = RgbaImage::from_pixel(width, height, WHITE);
            self.backend.plot(model, &mut canvas, &self.typeface)?;
            Ok(canvas)
        });

        match plotted {
            Ok(canvas) => Rendering {
                image: RenderedImage::new(canvas, describe(model)),
                fallback: None,
            },
            Err(reason) => {
                log::warn!(
                    "chart {:?} drawn as placeholder: {}",
                    display_title(model),
                    reason
                );
                let canvas = fallback::placeholder(model, &reason, width, height, &self.typeface);
                Rendering {
                    image: RenderedImage::new(canvas, format!("{} (not rendered)", describe(model))),
                    fallback: Some(reason),
                }
            },
        }
    }

    fn precheck(model: &ChartModel) -> Result<(), RenderError> {
        match model.kind {
            ChartKind::Unknown => Err(RenderError::UnsupportedKind(model.kind)),
            _ if !model.has_data() => Err(RenderError::NoData),
            _ => Ok(()),
        }
    }
}

pub(crate) fn display_title(model: &ChartModel) -> &str {
    match model.title.trim() {
        "" => "Chart from document",
        title => title,
    }
}

fn describe(model: &ChartModel) -> String {
    let series = model.series.len();
    format!(
        "{} chart \"{}\" with {} series",
        model.kind,
        display_title(model),
        series
    )
}
