//! Office Open XML reading: the OPC container, WordprocessingML bodies and
//! DrawingML charts.

pub mod charts;
pub mod docx;
pub mod error;
pub mod opc;

pub use error::{OoxmlError, Result};
