//! The normalized document model handed between pipeline stages.
//!
//! A document is an ordered list of [`ContentBlock`]s. The walker produces
//! text, table, image and chart-reference blocks; the pipeline later turns
//! chart references into [`ContentBlock::Rendered`] images and failed blocks
//! into [`ContentBlock::Annotation`]s.

mod chart;
mod image;
mod types;

pub use chart::{ChartHandle, ChartKind, ChartModel, Series};
pub use image::RenderedImage;
pub use types::{ContentBlock, ImageBlock, TableModel};
