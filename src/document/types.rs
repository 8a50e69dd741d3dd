use bytes::Bytes;

use super::chart::ChartHandle;
use super::image::RenderedImage;
use crate::common::Size;

/// One unit of flowed content, in document order.
#[derive(Debug)]
pub enum ContentBlock {
    /// A paragraph's text; never empty or whitespace-only.
    Text(String),
    Table(TableModel),
    /// An embedded picture, still encoded.
    Image(ImageBlock),
    /// An embedded chart, not yet resolved.
    ChartRef(ChartHandle),
    /// A single-line note standing in for a block that could not be shown.
    Annotation(String),
    /// A decoded or rendered raster, ready for placement.
    Rendered { image: RenderedImage, size: Size },
}

impl ContentBlock {
    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Text(_) => "text",
            ContentBlock::Table(_) => "table",
            ContentBlock::Image(_) => "image",
            ContentBlock::ChartRef(_) => "chart",
            ContentBlock::Annotation(_) => "annotation",
            ContentBlock::Rendered { .. } => "rendered image",
        }
    }
}

/// Encoded bytes of an embedded picture.
#[derive(Debug, Clone)]
pub struct ImageBlock {
    pub data: Bytes,
    /// Display size in points from the drawing extent.
    pub size: Option<Size>,
    pub description: String,
}

/// Table text, one `Vec` per row, every row as wide as the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableModel {
    rows: Vec<Vec<String>>,
}

impl TableModel {
    /// Build a table, clamping every row to the width of row 0.
    ///
    /// Short rows are padded with empty cells and long rows lose their
    /// trailing cells.
    pub fn new(mut rows: Vec<Vec<String>>) -> Self {
        let columns = rows.first().map_or(0, Vec::len);
        for (index, row) in rows.iter_mut().enumerate().skip(1) {
            if row.len() != columns {
                log::warn!(
                    "table row {} has {} cells, expected {}; clamping",
                    index,
                    row.len(),
                    columns
                );
                row.resize(columns, String::new());
            }
        }
        Self { rows }
    }

    #[inline]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of columns, taken from the header row.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
