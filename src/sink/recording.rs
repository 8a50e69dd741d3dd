use super::{PageSink, SinkError, SinkState};
use crate::common::{Position, Size};
use crate::document::RenderedImage;
use crate::layout::TableLayout;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    StartDocument,
    StartPage {
        number: usize,
        size: Size,
    },
    Text {
        text: String,
        position: Position,
        font_size: f32,
    },
    Image {
        width: u32,
        height: u32,
        description: String,
        position: Position,
        size: Size,
    },
    Table(TableLayout),
    EndPage,
    EndDocument,
}

impl SinkEvent {
    /// Whether the event puts content on a page.
    pub fn is_placement(&self) -> bool {
        matches!(
            self,
            SinkEvent::Text { .. } | SinkEvent::Image { .. } | SinkEvent::Table(_)
        )
    }
}

/// Keeps every sink call in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
    state: SinkState,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn page_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SinkEvent::StartPage { .. }))
            .count()
    }

    /// Placement events grouped by page.
    pub fn pages(&self) -> Vec<Vec<&SinkEvent>> {
        let mut pages = Vec::new();
        for event in &self.events {
            match event {
                SinkEvent::StartPage { .. } => pages.push(Vec::new()),
                e if e.is_placement() => {
                    if let Some(page) = pages.last_mut() {
                        page.push(e);
                    }
                },
                _ => {},
            }
        }
        pages
    }

    /// Every placed text line, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Sizes of placed images, in order.
    pub fn image_sizes(&self) -> Vec<Size> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Image { size, .. } => Some(*size),
                _ => None,
            })
            .collect()
    }

    pub fn tables(&self) -> Vec<&TableLayout> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Table(table) => Some(table),
                _ => None,
            })
            .collect()
    }

    pub fn is_finished(&self) -> bool {
        self.state == SinkState::Done
    }
}

impl PageSink for RecordingSink {
    fn start_document(&mut self) -> Result<(), SinkError> {
        self.state
            .advance("start_document", SinkState::Fresh, SinkState::Between)?;
        self.events.push(SinkEvent::StartDocument);
        Ok(())
    }

    fn start_page(&mut self, number: usize, size: Size) -> Result<(), SinkError> {
        self.state
            .advance("start_page", SinkState::Between, SinkState::InPage)?;
        self.events.push(SinkEvent::StartPage { number, size });
        Ok(())
    }

    fn place_text(&mut self, text: &str, position: Position, font_size: f32) -> Result<(), SinkError> {
        self.state.require_page("place_text")?;
        self.events.push(SinkEvent::Text {
            text: text.to_string(),
            position,
            font_size,
        });
        Ok(())
    }

    fn place_image(&mut self, image: &RenderedImage, position: Position, size: Size) -> Result<(), SinkError> {
        self.state.require_page("place_image")?;
        self.events.push(SinkEvent::Image {
            width: image.width(),
            height: image.height(),
            description: image.description().to_string(),
            position,
            size,
        });
        Ok(())
    }

    fn place_table(&mut self, table: &TableLayout) -> Result<(), SinkError> {
        self.state.require_page("place_table")?;
        self.events.push(SinkEvent::Table(table.clone()));
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), SinkError> {
        self.state
            .advance("end_page", SinkState::InPage, SinkState::Between)?;
        self.events.push(SinkEvent::EndPage);
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), SinkError> {
        self.state
            .advance("end_document", SinkState::Between, SinkState::Done)?;
        self.events.push(SinkEvent::EndDocument);
        Ok(())
    }
}
