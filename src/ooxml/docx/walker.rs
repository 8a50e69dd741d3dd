//! Walks a parsed body into the ordered [`ContentBlock`] sequence.
//!
//! Drawings are classified by the type of the relationship they reference,
//! never by file extension. A node that cannot be resolved (a dangling
//! relationship, a missing part) is logged and skipped; the walk itself
//! cannot fail.

use crate::common::Size;
use crate::common::unit::emu_to_pt;
use crate::document::{ChartHandle, ContentBlock, ImageBlock, TableModel};
use crate::ooxml::docx::body::{BodyNode, CellNode, DrawingNode, Graphic, ParagraphNode, TableNode};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type as RT;
use crate::ooxml::opc::{OpcPackage, Part};

/// Turns body nodes of `source` into content blocks.
pub struct ContentWalker<'a> {
    package: &'a OpcPackage,
    source: &'a Part,
}

impl<'a> ContentWalker<'a> {
    pub fn new(package: &'a OpcPackage, source: &'a Part) -> Self {
        Self { package, source }
    }

    pub fn walk(&self, body: &[BodyNode]) -> Vec<ContentBlock> {
        let mut blocks = Vec::with_capacity(body.len());
        for node in body {
            match node {
                BodyNode::Paragraph(paragraph) => self.walk_paragraph(paragraph, &mut blocks),
                BodyNode::Table(table) => blocks.push(ContentBlock::Table(table_model(table))),
            }
        }
        log::debug!("walked {} body nodes into {} blocks", body.len(), blocks.len());
        blocks
    }

    /// Text first, then the paragraph's drawings in run order.
    fn walk_paragraph(&self, paragraph: &ParagraphNode, blocks: &mut Vec<ContentBlock>) {
        let text = paragraph.text();
        if !text.trim().is_empty() {
            blocks.push(ContentBlock::Text(text));
        }

        for drawing in paragraph.drawings() {
            match self.drawing_block(drawing) {
                Ok(Some(block)) => blocks.push(block),
                Ok(None) => {},
                Err(e) => log::warn!("skipping drawing in {}: {}", self.source.partname(), e),
            }
        }
    }

    fn drawing_block(&self, drawing: &DrawingNode) -> Result<Option<ContentBlock>> {
        let size = drawing.extent_emu.map(|(cx, cy)| Size::new(emu_to_pt(cx), emu_to_pt(cy)));
        let description = drawing.description.clone().unwrap_or_default();

        match &drawing.graphic {
            Graphic::Chart { r_id } => {
                let (rel, part) = self.package.related_part(self.source, r_id)?;
                if !RT::is_chart(rel.reltype()) {
                    log::debug!("c:chart {} points at a {} relationship", r_id, rel.reltype());
                    return Ok(None);
                }
                Ok(Some(ContentBlock::ChartRef(ChartHandle::new(
                    r_id.as_str(),
                    part.partname().as_str(),
                    part.blob().clone(),
                    size,
                    description,
                ))))
            },
            Graphic::Picture { embed } => {
                let (rel, part) = self.package.related_part(self.source, embed)?;
                if !RT::is_image(rel.reltype()) {
                    log::debug!("a:blip {} points at a {} relationship", embed, rel.reltype());
                    return Ok(None);
                }
                if part.blob().is_empty() {
                    return Err(OoxmlError::InvalidFormat(format!(
                        "image part {} is empty",
                        part.partname()
                    )));
                }
                Ok(Some(ContentBlock::Image(ImageBlock {
                    data: part.blob().clone(),
                    size,
                    description,
                })))
            },
            Graphic::Other { uri } => {
                log::debug!("skipping drawing with graphic data {:?}", uri);
                Ok(None)
            },
        }
    }
}

fn table_model(table: &TableNode) -> TableModel {
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.cells.iter().map(cell_text).collect())
        .collect();
    TableModel::new(rows)
}

/// Paragraph text of a cell; a nested table contributes its cells' direct
/// paragraph text, one line per row.
fn cell_text(cell: &CellNode) -> String {
    let mut lines: Vec<String> = Vec::new();
    for block in &cell.blocks {
        match block {
            BodyNode::Paragraph(p) => push_line(&mut lines, p.text()),
            BodyNode::Table(nested) => {
                for row in &nested.rows {
                    let text = row
                        .cells
                        .iter()
                        .map(direct_text)
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ");
                    push_line(&mut lines, text);
                }
            },
        }
    }
    lines.join("\n")
}

fn direct_text(cell: &CellNode) -> String {
    let mut lines = Vec::new();
    for block in &cell.blocks {
        if let BodyNode::Paragraph(p) = block {
            push_line(&mut lines, p.text());
        }
    }
    lines.join(" ")
}

fn push_line(lines: &mut Vec<String>, text: String) {
    let text = text.trim();
    if !text.is_empty() {
        lines.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::body::{RowNode, RunItem};
    use smallvec::smallvec;

    fn para(text: &str) -> BodyNode {
        BodyNode::Paragraph(ParagraphNode {
            items: vec![RunItem::Text(text.to_string())],
        })
    }

    fn cell(blocks: Vec<BodyNode>) -> CellNode {
        CellNode { blocks }
    }

    #[test]
    fn test_cell_text_flattens_nested_table() {
        let nested = TableNode {
            rows: vec![RowNode {
                cells: smallvec![cell(vec![para("x")]), cell(vec![para("y")])],
            }],
        };
        let outer = cell(vec![para("top"), BodyNode::Table(nested), para("  ")]);
        assert_eq!(cell_text(&outer), "top\nx y");
    }

    #[test]
    fn test_table_model_from_rows() {
        let table = TableNode {
            rows: vec![
                RowNode {
                    cells: smallvec![cell(vec![para("H1")]), cell(vec![para("H2")])],
                },
                RowNode {
                    cells: smallvec![
                        cell(vec![para("a")]),
                        cell(vec![para("b")]),
                        cell(vec![para("c")])
                    ],
                },
            ],
        };
        let model = table_model(&table);
        assert_eq!(model.column_count(), 2);
        assert_eq!(model.rows()[1], ["a", "b"]);
    }
}
