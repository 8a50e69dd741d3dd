//! The conversion driver: package → content blocks → pages.
//!
//! ```
//! use longan::{Converter, RenderConfig};
//! use longan::document::ContentBlock;
//! use longan::sink::RecordingSink;
//!
//! let converter = Converter::new(RenderConfig::default())?;
//! let mut sink = RecordingSink::new();
//! let report = converter.convert_blocks(vec![ContentBlock::Text("Hello".into())], &mut sink)?;
//! assert_eq!(report.pages, 1);
//! assert_eq!(sink.texts(), vec!["Hello"]);
//! # Ok::<(), longan::Error>(())
//! ```

use std::fmt;

use crate::common::unit::{DEFAULT_DPI, px_to_pt};
use crate::common::{Result, Size};
use crate::config::RenderConfig;
use crate::document::{ChartHandle, ContentBlock, ImageBlock, RenderedImage};
use crate::layout::PageCompositor;
use crate::ooxml::charts::ChartResolver;
use crate::ooxml::docx::Package;
use crate::render::{ChartRenderer, MAX_CANVAS};
use crate::sink::PageSink;

/// Notice placed on the page of a document without any content.
pub const EMPTY_DOCUMENT_NOTICE: &str = "The document has no text, tables, images or charts.";

/// What one conversion produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionReport {
    pub pages: usize,
    /// Blocks placed on pages, annotations included.
    pub blocks: usize,
    pub charts: usize,
    /// Charts drawn as the placeholder.
    pub fallback_charts: usize,
    pub images: usize,
    /// Blocks replaced by an error note.
    pub annotations: usize,
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages, {} blocks, {} charts ({} placeholders), {} images, {} annotations",
            self.pages, self.blocks, self.charts, self.fallback_charts, self.images, self.annotations
        )
    }
}

/// Converts documents with a fixed configuration.
///
/// A converter holds no per-document state and can be shared between
/// threads; each call owns its blocks, chart cache and page state.
#[derive(Debug)]
pub struct Converter {
    config: RenderConfig,
    resolver: ChartResolver,
    renderer: ChartRenderer,
    empty_notice: Option<String>,
}

impl Converter {
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            resolver: ChartResolver::default(),
            renderer: ChartRenderer::default(),
            empty_notice: Some(EMPTY_DOCUMENT_NOTICE.to_string()),
        })
    }

    pub fn with_resolver(mut self, resolver: ChartResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_renderer(mut self, renderer: ChartRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Text placed when a document has no blocks; `None` leaves the page blank.
    pub fn with_empty_notice(mut self, notice: Option<String>) -> Self {
        self.empty_notice = notice;
        self
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[inline]
    pub fn resolver(&self) -> &ChartResolver {
        &self.resolver
    }

    #[inline]
    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    /// Walk, render and compose a whole package into `sink`.
    pub fn convert_package<S: PageSink + ?Sized>(&self, package: &Package, sink: &mut S) -> Result<ConversionReport> {
        let blocks = package.content()?;
        log::debug!("walked {} content blocks", blocks.len());
        self.convert_blocks(blocks, sink)
    }

    /// Render charts and decode pictures, then compose `blocks` into `sink`.
    pub fn convert_blocks<S: PageSink + ?Sized>(
        &self,
        blocks: Vec<ContentBlock>,
        sink: &mut S,
    ) -> Result<ConversionReport> {
        let mut report = ConversionReport::default();
        let blocks = self.prepare(blocks, &mut report);
        self.compose(blocks, sink, &mut report)?;
        log::info!("converted document: {}", report);
        Ok(report)
    }

    /// Replace every chart reference by its rendering and every picture by
    /// its decoded pixels, or by an annotation when it cannot be decoded.
    pub fn prepare(&self, blocks: Vec<ContentBlock>, report: &mut ConversionReport) -> Vec<ContentBlock> {
        blocks
            .into_iter()
            .map(|block| match block {
                ContentBlock::ChartRef(handle) => self.render_chart(&handle, report),
                ContentBlock::Image(image) => Self::decode_image(&image, report),
                other => other,
            })
            .collect()
    }

    fn render_chart(&self, handle: &ChartHandle, report: &mut ConversionReport) -> ContentBlock {
        let model = handle.model(&self.resolver);
        let (width, height) = self.chart_raster(handle.size());
        let rendering = self.renderer.render_checked(model, width, height);

        report.charts += 1;
        if rendering.is_fallback() {
            report.fallback_charts += 1;
        }
        log::debug!(
            "chart {} ({}) rendered at {}x{} px",
            handle.partname(),
            model.kind,
            width,
            height
        );

        let size = handle.size().filter(Size::is_positive).unwrap_or_else(|| {
            Size::new(
                px_to_pt(self.config.chart_width, DEFAULT_DPI),
                px_to_pt(self.config.chart_height, DEFAULT_DPI),
            )
        });
        ContentBlock::Rendered {
            image: rendering.image,
            size,
        }
    }

    /// Raster size for a chart shown at `size` points.
    fn chart_raster(&self, size: Option<Size>) -> (u32, u32) {
        match size.filter(Size::is_positive) {
            Some(size) => {
                let scale = self.config.chart_pixels_per_point;
                let px = |pt: f32| ((pt * scale).round() as u32).clamp(1, MAX_CANVAS);
                (px(size.width), px(size.height))
            },
            None => (self.config.chart_width, self.config.chart_height),
        }
    }

    fn decode_image(block: &ImageBlock, report: &mut ConversionReport) -> ContentBlock {
        report.images += 1;
        match RenderedImage::decode(&block.data, block.description.clone()) {
            Ok(image) => {
                let size = block
                    .size
                    .filter(Size::is_positive)
                    .unwrap_or_else(|| image.natural_size());
                ContentBlock::Rendered { image, size }
            },
            Err(e) => {
                log::warn!("could not decode image {}: {}", report.images, e);
                ContentBlock::Annotation(format!("Could not process image {}: {}", report.images, e))
            },
        }
    }

    fn compose<S: PageSink + ?Sized>(
        &self,
        blocks: Vec<ContentBlock>,
        sink: &mut S,
        report: &mut ConversionReport,
    ) -> Result<()> {
        let mut compositor = PageCompositor::new(&self.config, sink);

        if blocks.is_empty()
            && let Some(notice) = &self.empty_notice
        {
            compositor.add_text(notice)?;
        }

        for block in blocks {
            match block {
                ContentBlock::Text(text) => compositor.add_text(&text)?,
                ContentBlock::Annotation(text) => {
                    report.annotations += 1;
                    compositor.add_text(&text)?
                },
                ContentBlock::Table(table) => compositor.add_table(&table)?,
                ContentBlock::Rendered { image, size } => {
                    compositor.add_image(&image, Some(size))?;
                },
                block @ (ContentBlock::Image(_) | ContentBlock::ChartRef(_)) => {
                    let prepared = self.prepare(vec![block], report);
                    for block in prepared {
                        match block {
                            ContentBlock::Rendered { image, size } => {
                                compositor.add_image(&image, Some(size))?;
                            },
                            ContentBlock::Annotation(text) => {
                                report.annotations += 1;
                                compositor.add_text(&text)?
                            },
                            other => log::debug!("dropping {} block", other.kind()),
                        }
                    }
                },
            }
        }

        let composition = compositor.finish()?;
        report.pages = composition.pages;
        report.blocks = composition.blocks;
        Ok(())
    }
}
