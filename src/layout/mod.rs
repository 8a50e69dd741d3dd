//! Page composition: flowing content blocks onto fixed-size pages.

mod compositor;
mod table;
pub mod wrap;

use thiserror::Error;

use crate::sink::SinkError;

pub use compositor::{Composition, ImageSource, Page, PageCompositor};
pub use table::{CellLayout, RowLayout, TableLayout};

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
