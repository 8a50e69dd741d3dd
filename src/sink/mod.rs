//! Destinations for composed pages.
//!
//! The compositor drives a [`PageSink`] with a fixed call protocol:
//!
//! ```text
//! start_document (start_page place_*... end_page)+ end_document
//! ```
//!
//! Positions are top-left corners in page points, `y` growing downwards.

pub mod pdf;
pub mod recording;

use thiserror::Error;

use crate::common::{Position, Size};
use crate::document::RenderedImage;
use crate::layout::TableLayout;

pub use pdf::PdfSink;
pub use recording::{RecordingSink, SinkEvent};

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink called out of order: {0}")]
    Protocol(String),

    #[error("encoding error: {0}")]
    Encode(String),
}

pub trait PageSink {
    fn start_document(&mut self) -> Result<(), SinkError>;

    /// Open page `number` (1-based).
    fn start_page(&mut self, number: usize, size: Size) -> Result<(), SinkError>;

    /// One already wrapped line of text.
    fn place_text(&mut self, text: &str, position: Position, font_size: f32) -> Result<(), SinkError>;

    fn place_image(&mut self, image: &RenderedImage, position: Position, size: Size) -> Result<(), SinkError>;

    fn place_table(&mut self, table: &TableLayout) -> Result<(), SinkError>;

    fn end_page(&mut self) -> Result<(), SinkError>;

    fn end_document(&mut self) -> Result<(), SinkError>;
}

/// Where a sink is in the call protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SinkState {
    #[default]
    Fresh,
    Between,
    InPage,
    Done,
}

impl SinkState {
    pub(crate) fn advance(&mut self, call: &str, from: SinkState, to: SinkState) -> Result<(), SinkError> {
        if *self != from {
            return Err(SinkError::Protocol(format!("{} while {:?}", call, self)));
        }
        *self = to;
        Ok(())
    }

    pub(crate) fn require_page(&self, call: &str) -> Result<(), SinkError> {
        match self {
            SinkState::InPage => Ok(()),
            state => Err(SinkError::Protocol(format!("{} while {:?}", call, state))),
        }
    }
}
