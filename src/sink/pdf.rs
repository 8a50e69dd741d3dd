//! PDF output with `pdf-writer`.
//!
//! Text uses the standard Helvetica font with WinAnsi encoding, so no font
//! file is embedded; characters outside Latin-1 are written as `?`. Images
//! become Flate-compressed RGB XObjects with a soft mask when they carry
//! transparency.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use super::{PageSink, SinkError, SinkState};
use crate::common::{Position, Size};
use crate::document::RenderedImage;
use crate::layout::TableLayout;

const FONT_NAME: Name<'static> = Name(b"F1");
/// Baseline offset below the top of a line, relative to the font size.
const ASCENT: f32 = 0.8;

struct OpenPage {
    id: Ref,
    size: Size,
    content: Content,
    images: Vec<(String, Ref)>,
}

pub struct PdfSink<W: Write> {
    writer: W,
    pdf: Pdf,
    next_id: Ref,
    catalog_id: Ref,
    page_tree_id: Ref,
    font_id: Ref,
    page_ids: Vec<Ref>,
    page: Option<OpenPage>,
    image_count: usize,
    state: SinkState,
}

impl<W: Write> PdfSink<W> {
    pub fn new(writer: W) -> Self {
        let mut next_id = Ref::new(1);
        let catalog_id = next_id.bump();
        let page_tree_id = next_id.bump();
        let font_id = next_id.bump();
        Self {
            writer,
            pdf: Pdf::new(),
            next_id,
            catalog_id,
            page_tree_id,
            font_id,
            page_ids: Vec::new(),
            page: None,
            image_count: 0,
            state: SinkState::default(),
        }
    }

    /// The underlying writer; complete once `end_document` has returned.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn open_page(&mut self, call: &str) -> Result<&mut OpenPage, SinkError> {
        self.state.require_page(call)?;
        self.page
            .as_mut()
            .ok_or_else(|| SinkError::Protocol(format!("{} without an open page", call)))
    }

    fn write_line(content: &mut Content, text: &str, x: f32, top: f32, font_size: f32, page_height: f32) {
        let encoded = win_ansi(text);
        content
            .begin_text()
            .set_font(FONT_NAME, font_size)
            .next_line(x, page_height - top - font_size * ASCENT)
            .show(Str(&encoded))
            .end_text();
    }

    fn embed_image(&mut self, image: &RenderedImage) -> Result<Ref, SinkError> {
        let pixels = image.pixels();
        let (width, height) = pixels.dimensions();
        let rgb: Vec<u8> = pixels.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
        let has_alpha = pixels.pixels().any(|p| p.0[3] < 255);

        let mask_id = if has_alpha {
            let alpha: Vec<u8> = pixels.pixels().map(|p| p.0[3]).collect();
            let alpha = deflate(&alpha)?;
            let mask_id = self.next_id.bump();
            let mut mask = self.pdf.image_xobject(mask_id, &alpha);
            mask.filter(Filter::FlateDecode);
            mask.width(width as i32);
            mask.height(height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            Some(mask_id)
        } else {
            None
        };

        let rgb = deflate(&rgb)?;
        let image_id = self.next_id.bump();
        let mut xobject = self.pdf.image_xobject(image_id, &rgb);
        xobject.filter(Filter::FlateDecode);
        xobject.width(width as i32);
        xobject.height(height as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            xobject.s_mask(mask_id);
        }
        xobject.finish();
        Ok(image_id)
    }
}

impl<W: Write> PageSink for PdfSink<W> {
    fn start_document(&mut self) -> Result<(), SinkError> {
        self.state
            .advance("start_document", SinkState::Fresh, SinkState::Between)?;
        self.pdf
            .type1_font(self.font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        Ok(())
    }

    fn start_page(&mut self, _number: usize, size: Size) -> Result<(), SinkError> {
        self.state
            .advance("start_page", SinkState::Between, SinkState::InPage)?;
        let id = self.next_id.bump();
        self.page_ids.push(id);
        self.page = Some(OpenPage {
            id,
            size,
            content: Content::new(),
            images: Vec::new(),
        });
        Ok(())
    }

    fn place_text(&mut self, text: &str, position: Position, font_size: f32) -> Result<(), SinkError> {
        let page = self.open_page("place_text")?;
        Self::write_line(
            &mut page.content,
            text,
            position.x,
            position.y,
            font_size,
            page.size.height,
        );
        Ok(())
    }

    fn place_image(&mut self, image: &RenderedImage, position: Position, size: Size) -> Result<(), SinkError> {
        self.open_page("place_image")?;
        let image_id = self.embed_image(image)?;
        self.image_count += 1;
        let name = format!("Im{}", self.image_count);

        let page = self.open_page("place_image")?;
        let bottom = page.size.height - position.y - size.height;
        page.content
            .save_state()
            .transform([size.width, 0.0, 0.0, size.height, position.x, bottom])
            .x_object(Name(name.as_bytes()))
            .restore_state();
        page.images.push((name, image_id));
        Ok(())
    }

    fn place_table(&mut self, table: &TableLayout) -> Result<(), SinkError> {
        let page = self.open_page("place_table")?;
        let page_height = page.size.height;
        let content = &mut page.content;

        content.save_state().set_line_width(0.5).set_stroke_gray(0.4);
        for cell in table.cells() {
            content.rect(
                cell.origin.x,
                page_height - cell.origin.y - cell.size.height,
                cell.size.width,
                cell.size.height,
            );
        }
        content.stroke().restore_state();

        for cell in table.cells() {
            for (index, line) in cell.lines.iter().enumerate() {
                Self::write_line(
                    content,
                    line,
                    cell.origin.x + table.padding,
                    cell.origin.y + table.padding + index as f32 * table.line_height,
                    table.font_size,
                    page_height,
                );
            }
        }
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), SinkError> {
        self.state
            .advance("end_page", SinkState::InPage, SinkState::Between)?;
        let Some(page) = self.page.take() else {
            return Err(SinkError::Protocol("end_page without an open page".to_string()));
        };

        let content_id = self.next_id.bump();
        let stream = deflate(page.content.finish().as_slice())?;
        self.pdf
            .stream(content_id, &stream)
            .filter(Filter::FlateDecode);

        let mut pdf_page = self.pdf.page(page.id);
        pdf_page
            .media_box(Rect::new(0.0, 0.0, page.size.width, page.size.height))
            .parent(self.page_tree_id)
            .contents(content_id);
        let mut resources = pdf_page.resources();
        resources.fonts().pair(FONT_NAME, self.font_id);
        if !page.images.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, id) in &page.images {
                xobjects.pair(Name(name.as_bytes()), *id);
            }
        }
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), SinkError> {
        self.state
            .advance("end_document", SinkState::Between, SinkState::Done)?;

        self.pdf.catalog(self.catalog_id).pages(self.page_tree_id);
        self.pdf
            .pages(self.page_tree_id)
            .kids(self.page_ids.iter().copied())
            .count(self.page_ids.len() as i32);
        let info_id = self.next_id.bump();
        self.pdf
            .document_info(info_id)
            .producer(TextStr(concat!("longan ", env!("CARGO_PKG_VERSION"))));

        let pdf = std::mem::replace(&mut self.pdf, Pdf::new());
        self.writer.write_all(&pdf.finish())?;
        self.writer.flush()?;
        log::debug!("wrote PDF with {} pages", self.page_ids.len());
        Ok(())
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, SinkError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Latin-1 subset of WinAnsi; anything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            c if (' '..='~').contains(&c) || ('\u{a0}'..='\u{ff}').contains(&c) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}
