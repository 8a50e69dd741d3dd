//! Crate-level error type.
//!
//! Every layer keeps its own `thiserror` enum (`OpcError`, `OoxmlError`,
//! `ResolveError`, `RenderError`, `SinkError`, `ConfigError`). Only resource
//! failures travel all the way up; they end up here.

pub mod conversions;
pub mod types;

pub use types::{Error, Result};
