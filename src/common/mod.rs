//! Types and helpers shared by every stage of the pipeline.

pub mod error;
pub mod geometry;
pub mod unit;
pub(crate) mod xml;

pub use error::{Error, Result};
pub use geometry::{Position, Size};
