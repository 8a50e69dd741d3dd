//! Table geometry: equal-width columns, rows as tall as their tallest cell.

use super::wrap::wrap_text;
use crate::common::{Position, Size};
use crate::document::TableModel;

#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub height: f32,
    /// Wrapped lines, one `Vec` per cell.
    pub cells: Vec<Vec<String>>,
}

/// A table (or a run of its rows) positioned on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub origin: Position,
    pub column_widths: Vec<f32>,
    pub rows: Vec<RowLayout>,
    pub font_size: f32,
    pub line_height: f32,
    pub padding: f32,
}

/// One cell of a [`TableLayout`] in page coordinates.
#[derive(Debug, Clone, Copy)]
pub struct CellLayout<'a> {
    pub row: usize,
    pub column: usize,
    pub origin: Position,
    pub size: Size,
    pub lines: &'a [String],
}

impl TableLayout {
    /// Lay out `table` across `width` points, starting at `origin`.
    pub fn build(
        table: &TableModel,
        origin: Position,
        width: f32,
        font_size: f32,
        line_height: f32,
        padding: f32,
    ) -> Self {
        let columns = table.column_count();
        let column_width = if columns == 0 { 0.0 } else { width / columns as f32 };
        let text_width = (column_width - 2.0 * padding).max(font_size);

        let rows = table
            .rows()
            .iter()
            .map(|row| {
                let cells: Vec<Vec<String>> = row
                    .iter()
                    .map(|cell| wrap_text(cell.trim(), text_width, font_size))
                    .collect();
                let lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
                RowLayout {
                    height: lines as f32 * line_height + 2.0 * padding,
                    cells,
                }
            })
            .collect();

        Self {
            origin,
            column_widths: vec![column_width; columns],
            rows,
            font_size,
            line_height,
            padding,
        }
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }

    pub fn width(&self) -> f32 {
        self.column_widths.iter().sum()
    }

    pub fn height(&self) -> f32 {
        self.rows.iter().map(|r| r.height).sum()
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = CellLayout<'_>> {
        let mut top = self.origin.y;
        self.rows.iter().enumerate().flat_map(move |(row, layout)| {
            let y = top;
            top += layout.height;
            let mut left = self.origin.x;
            layout
                .cells
                .iter()
                .zip(&self.column_widths)
                .enumerate()
                .map(move |(column, (lines, width))| {
                    let cell = CellLayout {
                        row,
                        column,
                        origin: Position::new(left, y),
                        size: Size::new(*width, layout.height),
                        lines,
                    };
                    left += width;
                    cell
                })
        })
    }
}
