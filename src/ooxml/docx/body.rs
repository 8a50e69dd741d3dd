//! Parser for the `w:body` of a WordprocessingML main document part.
//!
//! The body is reduced to a closed tree of block nodes. Formatting is
//! dropped; what survives is the text of each paragraph in run order, the
//! drawings anchored in its runs and the cell structure of tables.
//!
//! Every `parse_*` function below is entered right after the `Start` event
//! of its element and returns once the matching `End` has been consumed.

use crate::common::xml::{attr_i64, attr_value, read_text, skip_element};
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;

/// A block-level node of the body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyNode {
    Paragraph(ParagraphNode),
    Table(TableNode),
}

/// A paragraph flattened to its inline items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphNode {
    pub items: Vec<RunItem>,
}

impl ParagraphNode {
    /// Run text with tabs and breaks expanded to `\t` and `\n`.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for item in &self.items {
            match item {
                RunItem::Text(t) => text.push_str(t),
                RunItem::Tab => text.push('\t'),
                RunItem::Break => text.push('\n'),
                RunItem::Drawing(_) => {},
            }
        }
        text
    }

    pub fn drawings(&self) -> impl Iterator<Item = &DrawingNode> {
        self.items.iter().filter_map(|item| match item {
            RunItem::Drawing(d) => Some(d),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunItem {
    Text(String),
    Tab,
    Break,
    Drawing(DrawingNode),
}

/// A `w:drawing` (inline or anchored).
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingNode {
    pub graphic: Graphic,
    /// `wp:extent` as `(cx, cy)` in EMUs.
    pub extent_emu: Option<(i64, i64)>,
    /// `wp:docPr/@descr`, falling back to `@name`.
    pub description: Option<String>,
}

/// What a drawing's `a:graphicData` carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Graphic {
    /// `a:blip r:embed`
    Picture { embed: String },
    /// `c:chart r:id`
    Chart { r_id: String },
    /// SmartArt, shapes, ink and anything else.
    Other { uri: Option<String> },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableNode {
    pub rows: Vec<RowNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowNode {
    pub cells: SmallVec<[CellNode; 8]>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellNode {
    pub blocks: Vec<BodyNode>,
}

/// Body nodes of a main document part.
#[derive(Debug, Default)]
pub struct ParsedBody {
    pub nodes: Vec<BodyNode>,
    /// Set when the XML broke off partway; `nodes` holds every block that
    /// was complete before the break.
    pub error: Option<OoxmlError>,
}

/// Parse the XML of a main document part into its body nodes.
///
/// Ill-formed XML inside `w:body` does not fail the parse. Only a part
/// without a readable `w:body` is an error.
pub fn parse_body(xml: &[u8]) -> Result<ParsedBody> {
    let mut reader = Reader::from_reader(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"body" => {
                let mut nodes = Vec::new();
                let error = parse_blocks(&mut reader, &mut nodes).err();
                return Ok(ParsedBody { nodes, error });
            },
            Event::Empty(e) if e.local_name().as_ref() == b"body" => {
                return Ok(ParsedBody::default());
            },
            Event::Eof => {
                return Err(OoxmlError::InvalidFormat(
                    "main document part has no w:body".to_string(),
                ));
            },
            _ => {},
        }
    }
}

/// Block content of `w:body`, `w:tc`, `w:sdtContent` and friends.
fn parse_blocks(reader: &mut Reader<&[u8]>, out: &mut Vec<BodyNode>) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => out.push(BodyNode::Paragraph(parse_paragraph(reader)?)),
                b"tbl" => out.push(BodyNode::Table(parse_table(reader)?)),
                b"sdt" | b"sdtContent" | b"customXml" | b"ins" | b"moveTo"
                | b"AlternateContent" | b"Choice" => parse_blocks(reader, out)?,
                _ => skip_element(reader, &e)?,
            },
            Event::End(_) | Event::Eof => return Ok(()),
            _ => {},
        }
    }
}

fn parse_paragraph(reader: &mut Reader<&[u8]>) -> Result<ParagraphNode> {
    let mut paragraph = ParagraphNode::default();
    parse_inline(reader, &mut paragraph.items)?;
    Ok(paragraph)
}

/// Inline content of a paragraph: runs, possibly wrapped in hyperlinks,
/// insertions, content controls or fields.
fn parse_inline(reader: &mut Reader<&[u8]>, items: &mut Vec<RunItem>) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"r" => parse_run(reader, items)?,
                b"hyperlink" | b"ins" | b"moveTo" | b"smartTag" | b"fldSimple" | b"sdt"
                | b"sdtContent" | b"customXml" | b"AlternateContent" | b"Choice" => {
                    parse_inline(reader, items)?
                },
                _ => skip_element(reader, &e)?,
            },
            Event::End(_) | Event::Eof => return Ok(()),
            _ => {},
        }
    }
}

fn parse_run(reader: &mut Reader<&[u8]>, items: &mut Vec<RunItem>) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"t" => {
                    let text = read_text(reader)?;
                    if !text.is_empty() {
                        items.push(RunItem::Text(text));
                    }
                },
                b"tab" => {
                    items.push(RunItem::Tab);
                    skip_element(reader, &e)?;
                },
                b"br" | b"cr" => {
                    items.push(RunItem::Break);
                    skip_element(reader, &e)?;
                },
                b"drawing" => items.push(RunItem::Drawing(parse_drawing(reader)?)),
                b"AlternateContent" | b"Choice" => parse_run(reader, items)?,
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => items.push(RunItem::Tab),
                b"br" | b"cr" => items.push(RunItem::Break),
                _ => {},
            },
            Event::End(_) | Event::Eof => return Ok(()),
            _ => {},
        }
    }
}

/// Everything inside `w:drawing`, flattened: the extent, the description,
/// the graphic data URI and the first picture or chart reference.
fn parse_drawing(reader: &mut Reader<&[u8]>) -> Result<DrawingNode> {
    let mut extent = None;
    let mut description = None;
    let mut uri = None;
    let mut embed = None;
    let mut chart = None;
    let mut depth = 1usize;

    let mut visit = |e: &BytesStart<'_>| match e.local_name().as_ref() {
        b"extent" if extent.is_none() => {
            if let (Some(cx), Some(cy)) = (attr_i64(e, b"cx"), attr_i64(e, b"cy")) {
                extent = Some((cx, cy));
            }
        },
        b"docPr" => {
            description = attr_value(e, b"descr")
                .filter(|d| !d.trim().is_empty())
                .or_else(|| attr_value(e, b"name"));
        },
        b"graphicData" if uri.is_none() => uri = attr_value(e, b"uri"),
        b"blip" if embed.is_none() => embed = attr_value(e, b"embed"),
        b"chart" if chart.is_none() => chart = attr_value(e, b"id"),
        _ => {},
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                visit(&e);
            },
            Event::Empty(e) => visit(&e),
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    let graphic = match (chart, embed) {
        (Some(r_id), _) => Graphic::Chart { r_id },
        (None, Some(embed)) => Graphic::Picture { embed },
        (None, None) => Graphic::Other { uri },
    };
    Ok(DrawingNode {
        graphic,
        extent_emu: extent,
        description,
    })
}

fn parse_table(reader: &mut Reader<&[u8]>) -> Result<TableNode> {
    let mut table = TableNode::default();
    parse_rows(reader, &mut table.rows)?;
    Ok(table)
}

fn parse_rows(reader: &mut Reader<&[u8]>, rows: &mut Vec<RowNode>) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tr" => {
                    let mut row = RowNode::default();
                    parse_cells(reader, &mut row.cells)?;
                    rows.push(row);
                },
                b"sdt" | b"sdtContent" | b"customXml" => parse_rows(reader, rows)?,
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"tr" => rows.push(RowNode::default()),
            Event::End(_) | Event::Eof => return Ok(()),
            _ => {},
        }
    }
}

fn parse_cells(reader: &mut Reader<&[u8]>, cells: &mut SmallVec<[CellNode; 8]>) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tc" => {
                    let mut cell = CellNode::default();
                    parse_blocks(reader, &mut cell.blocks)?;
                    cells.push(cell);
                },
                b"sdt" | b"sdtContent" | b"customXml" => parse_cells(reader, cells)?,
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"tc" => cells.push(CellNode::default()),
            Event::End(_) | Event::Eof => return Ok(()),
            _ => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
 xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"
 xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
 xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"
 xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
 xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
            body
        )
    }

    fn paragraph(node: &BodyNode) -> &ParagraphNode {
        match node {
            BodyNode::Paragraph(p) => p,
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_paragraph_text_keeps_spaces_and_entities() {
        let xml = doc(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Fish &amp; </w:t></w:r><w:r><w:t>chips</w:t><w:tab/><w:t>&#x263A;</w:t><w:br/><w:t>end</w:t></w:r></w:p>"#,
        );
        let body = parse_body(xml.as_bytes()).unwrap().nodes;
        assert_eq!(body.len(), 1);
        assert_eq!(paragraph(&body[0]).text(), "Fish & chips\t\u{263A}\nend");
    }

    #[test]
    fn test_hyperlinks_and_insertions_included_deletions_dropped() {
        let xml = doc(
            r#"<w:p><w:hyperlink r:id="rId9"><w:r><w:t>link</w:t></w:r></w:hyperlink><w:ins w:id="1"><w:r><w:t> added</w:t></w:r></w:ins><w:del w:id="2"><w:r><w:delText> gone</w:delText></w:r></w:del></w:p>"#,
        );
        let body = parse_body(xml.as_bytes()).unwrap().nodes;
        assert_eq!(paragraph(&body[0]).text(), "link added");
    }

    #[test]
    fn test_content_controls_are_descended() {
        let xml = doc(
            r#"<w:p><w:r><w:t>one</w:t></w:r></w:p><w:sdt><w:sdtPr><w:alias w:val="x"/></w:sdtPr><w:sdtContent><w:p><w:r><w:t>two</w:t></w:r></w:p></w:sdtContent></w:sdt><w:p><w:r><w:t>three</w:t></w:r></w:p>"#,
        );
        let body = parse_body(xml.as_bytes()).unwrap().nodes;
        let texts: Vec<String> = body.iter().map(|n| paragraph(n).text()).collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[test]
    fn test_inline_picture() {
        let xml = doc(
            r#"<w:p><w:r><w:drawing><wp:inline><wp:extent cx="1270000" cy="635000"/><wp:docPr id="1" name="Picture 1" descr="A logo"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:blipFill><a:blip r:embed="rId5"/></pic:blipFill><pic:spPr><a:xfrm><a:ext cx="1" cy="1"/></a:xfrm></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
        );
        let body = parse_body(xml.as_bytes()).unwrap().nodes;
        let drawings: Vec<&DrawingNode> = paragraph(&body[0]).drawings().collect();
        assert_eq!(drawings.len(), 1);
        assert_eq!(
            drawings[0].graphic,
            Graphic::Picture {
                embed: "rId5".to_string()
            }
        );
        assert_eq!(drawings[0].extent_emu, Some((1_270_000, 635_000)));
        assert_eq!(drawings[0].description.as_deref(), Some("A logo"));
    }

    #[test]
    fn test_anchored_chart_in_alternate_content() {
        let xml = doc(
            r#"<w:p><w:r><mc:AlternateContent><mc:Choice Requires="c14"><w:drawing><wp:anchor><wp:extent cx="5486400" cy="3200400"/><wp:docPr id="2" name="Chart 2"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart r:id="rId4"/></a:graphicData></a:graphic></wp:anchor></w:drawing></mc:Choice><mc:Fallback><w:drawing><wp:inline><a:graphic><a:graphicData uri="x"><c:chart r:id="rId4"/></a:graphicData></a:graphic></wp:inline></w:drawing></mc:Fallback></mc:AlternateContent></w:r></w:p>"#,
        );
        let body = parse_body(xml.as_bytes()).unwrap().nodes;
        let drawings: Vec<&DrawingNode> = paragraph(&body[0]).drawings().collect();
        assert_eq!(drawings.len(), 1);
        assert_eq!(
            drawings[0].graphic,
            Graphic::Chart {
                r_id: "rId4".to_string()
            }
        );
        assert_eq!(drawings[0].description.as_deref(), Some("Chart 2"));
    }

    #[test]
    fn test_unknown_graphic() {
        let xml = doc(
            r#"<w:p><w:r><w:drawing><wp:inline><a:graphic><a:graphicData uri="http://schemas.microsoft.com/office/word/2010/wordprocessingShape"><wps:wsp xmlns:wps="urn:wps"/></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
        );
        let body = parse_body(xml.as_bytes()).unwrap().nodes;
        let drawing = paragraph(&body[0]).drawings().next().unwrap();
        assert!(matches!(drawing.graphic, Graphic::Other { uri: Some(ref u) } if u.ends_with("wordprocessingShape")));
        assert_eq!(drawing.extent_emu, None);
    }

    #[test]
    fn test_table_rows_and_nested_table() {
        let xml = doc(
            r#"<w:tbl><w:tblPr/><w:tblGrid><w:gridCol w:w="10"/></w:tblGrid><w:tr><w:tc><w:tcPr/><w:p><w:r><w:t>H1</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>H2</w:t></w:r></w:p></w:tc></w:tr><w:tr><w:tc><w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p/></w:tc><w:tc/></w:tr></w:tbl>"#,
        );
        let body = parse_body(xml.as_bytes()).unwrap().nodes;
        let BodyNode::Table(table) = &body[0] else {
            panic!("expected table");
        };
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells.len(), 2);
        assert_eq!(table.rows[1].cells.len(), 2);
        assert!(matches!(table.rows[1].cells[0].blocks[0], BodyNode::Table(_)));
        assert!(table.rows[1].cells[1].blocks.is_empty());
    }

    #[test]
    fn test_missing_body() {
        let xml = r#"<w:document xmlns:w="urn:w"/>"#;
        assert!(matches!(
            parse_body(xml.as_bytes()),
            Err(OoxmlError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_malformed_xml_keeps_blocks_before_the_break() {
        let xml = doc(
            "<w:p><w:r><w:t>first</w:t></w:r></w:p><w:p><w:r><w:t>unterminated</w:r></w:p><w:p><w:r><w:t>after</w:t></w:r></w:p>",
        );
        let body = parse_body(xml.as_bytes()).unwrap();
        assert!(matches!(body.error, Some(OoxmlError::Xml(_))));
        assert_eq!(body.nodes.len(), 1);
        assert_eq!(paragraph(&body.nodes[0]).text(), "first");
    }

    #[test]
    fn test_malformed_before_body_is_an_error() {
        assert!(parse_body(b"<w:document></w:x>").is_err());
    }
}
