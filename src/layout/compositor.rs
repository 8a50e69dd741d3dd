use super::table::TableLayout;
use super::wrap::wrap_text;
use super::ComposeError;
use crate::common::{Position, Size};
use crate::config::RenderConfig;
use crate::document::{RenderedImage, TableModel};
use crate::sink::PageSink;

/// The page currently being filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    number: usize,
    cursor: f32,
    blocks: usize,
}

impl Page {
    /// 1-based page number.
    #[inline]
    pub fn number(&self) -> usize {
        self.number
    }

    /// Top of the free space, in points from the page top.
    #[inline]
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Blocks started on this page.
    #[inline]
    pub fn blocks(&self) -> usize {
        self.blocks
    }
}

/// Picture to place: already decoded, or still encoded.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'i> {
    Rendered(&'i RenderedImage),
    Encoded(&'i [u8]),
}

impl<'i> From<&'i RenderedImage> for ImageSource<'i> {
    fn from(image: &'i RenderedImage) -> Self {
        ImageSource::Rendered(image)
    }
}

impl<'i> From<&'i [u8]> for ImageSource<'i> {
    fn from(data: &'i [u8]) -> Self {
        ImageSource::Encoded(data)
    }
}

/// Totals returned by [`PageCompositor::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Composition {
    pub pages: usize,
    pub blocks: usize,
}

/// Flows blocks top to bottom onto fixed-size pages.
///
/// One page is open at a time. The cursor only moves down while a page is
/// open and goes back to the top margin in [`break_page`](Self::break_page).
/// Every block is kept whole: when one does not fit below the cursor it
/// starts a fresh page, and one that is taller than an empty page is placed
/// anyway and overflows that page.
pub struct PageCompositor<'a, S: PageSink + ?Sized> {
    config: &'a RenderConfig,
    sink: &'a mut S,
    page: Option<Page>,
    started: bool,
    pages: usize,
    blocks: usize,
}

impl<'a, S: PageSink + ?Sized> PageCompositor<'a, S> {
    pub fn new(config: &'a RenderConfig, sink: &'a mut S) -> Self {
        Self {
            config,
            sink,
            page: None,
            started: false,
            pages: 0,
            blocks: 0,
        }
    }

    #[inline]
    pub fn current_page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// Blocks placed so far.
    #[inline]
    pub fn blocks_placed(&self) -> usize {
        self.blocks
    }

    fn top(&self) -> f32 {
        self.config.margins.top
    }

    fn bottom(&self) -> f32 {
        self.config.content_bottom()
    }

    fn open(&mut self) -> Result<&mut Page, ComposeError> {
        if !self.started {
            self.sink.start_document()?;
            self.started = true;
        }
        if self.page.is_none() {
            self.sink.start_page(self.pages + 1, self.config.page_size())?;
            self.pages += 1;
        }
        let fresh = Page {
            number: self.pages,
            cursor: self.top(),
            blocks: 0,
        };
        Ok(self.page.get_or_insert(fresh))
    }

    /// Finalize the open page and start the next one.
    pub fn break_page(&mut self) -> Result<(), ComposeError> {
        if self.page.is_some() {
            self.sink.end_page()?;
            self.page = None;
        }
        self.open()?;
        Ok(())
    }

    /// Make room for a block of `height` points, breaking the page when the
    /// block does not fit below the cursor and the page already holds
    /// something.
    fn reserve(&mut self, height: f32) -> Result<f32, ComposeError> {
        let bottom = self.bottom();
        let page = *self.open()?;
        if page.blocks > 0 && page.cursor + height > bottom {
            self.break_page()?;
        }
        let page = self.open()?;
        page.blocks += 1;
        Ok(page.cursor)
    }

    fn advance(&mut self, by: f32) {
        if let Some(page) = self.page.as_mut() {
            page.cursor += by.max(0.0);
        }
    }

    /// Wrap `text` to the content width and place it as one block.
    ///
    /// The paragraph moves whole to a fresh page when it does not fit below
    /// the cursor; one taller than an empty page runs past its bottom margin.
    pub fn add_text(&mut self, text: &str) -> Result<(), ComposeError> {
        let config = self.config;
        let lines = wrap_text(text, config.content_width(), config.font_size);
        if lines.is_empty() {
            return Ok(());
        }

        let mut cursor = self.reserve(lines.len() as f32 * config.line_height)?;
        for line in &lines {
            self.sink
                .place_text(line, Position::new(config.margins.left, cursor), config.font_size)?;
            cursor += config.line_height;
        }
        self.advance(lines.len() as f32 * config.line_height);

        self.blocks += 1;
        Ok(())
    }

    /// Place a picture, shrunk to the configured maximum and centered.
    ///
    /// `size` is the intended display size in points; without one the
    /// picture's natural size at 96 dpi is used. Returns the placed size.
    pub fn add_image<'i>(&mut self, source: impl Into<ImageSource<'i>>, size: Option<Size>) -> Result<Size, ComposeError> {
        let decoded;
        let image = match source.into() {
            ImageSource::Rendered(image) => image,
            ImageSource::Encoded(data) => {
                decoded = RenderedImage::decode(data, "")?;
                &decoded
            },
        };

        let config = self.config;
        let natural = size
            .filter(Size::is_positive)
            .unwrap_or_else(|| image.natural_size());
        let bounds = Size::new(
            config.max_image_width.min(config.content_width()),
            config.max_image_height.min(config.content_height()),
        );
        let placed = natural.fit_within(bounds);

        let top = self.reserve(placed.height)?;
        let x = config.margins.left + (config.content_width() - placed.width).max(0.0) / 2.0;
        self.sink.place_image(image, Position::new(x, top), placed)?;
        self.advance(placed.height + config.block_gap);

        self.blocks += 1;
        Ok(placed)
    }

    /// Place a table with equal-width columns across the content width.
    pub fn add_table(&mut self, table: &TableModel) -> Result<(), ComposeError> {
        if table.is_empty() {
            log::debug!("skipping empty table");
            return Ok(());
        }

        let config = self.config;
        let mut layout = TableLayout::build(
            table,
            Position::new(config.margins.left, self.top()),
            config.content_width(),
            config.font_size,
            config.line_height,
            config.cell_padding,
        );
        layout.origin.y = self.reserve(layout.height())?;
        self.sink.place_table(&layout)?;
        self.advance(layout.height() + config.block_gap);

        self.blocks += 1;
        Ok(())
    }

    /// Close the last page and the document.
    ///
    /// A document with no blocks still gets one empty page.
    pub fn finish(mut self) -> Result<Composition, ComposeError> {
        self.open()?;
        self.sink.end_page()?;
        self.page = None;
        self.sink.end_document()?;
        Ok(Composition {
            pages: self.pages,
            blocks: self.blocks,
        })
    }
}
