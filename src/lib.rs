//! Longan - paginated rendering of Word documents with native chart rasterization
//!
//! This library reads `.docx` packages, normalizes their body into an ordered
//! sequence of content blocks, draws embedded charts itself instead of
//! relying on the authoring application, and flows everything onto
//! fixed-size pages.
//!
//! # Features
//!
//! - **OPC reader**: zip container, content types and relationships
//! - **Content walker**: paragraphs, tables, pictures and chart references in document order
//! - **Chart resolver**: bar, line, pie and area charts from cached or live data
//! - **Chart renderer**: raster plots with a deterministic placeholder on failure
//! - **Page compositor**: wrapping, image scaling and page breaks
//! - **PDF output**: through the [`sink::PdfSink`], or any [`sink::PageSink`]
//!
//! # Example - Converting a DOCX file
//!
//! ```no_run
//! use longan::{Converter, RenderConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = Converter::new(RenderConfig::default())?;
//! let report = longan::convert::convert_file(
//!     &converter,
//!     Path::new("report.docx"),
//!     Path::new("report.pdf"),
//! )?;
//! println!("{} pages, {} charts", report.pages, report.charts);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Inspecting content blocks
//!
//! ```no_run
//! use longan::DocxPackage;
//! use longan::document::ContentBlock;
//! use longan::ooxml::charts::ChartResolver;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pkg = DocxPackage::open("report.docx")?;
//! let resolver = ChartResolver::default();
//! for block in pkg.content()? {
//!     match block {
//!         ContentBlock::Text(text) => println!("text: {}", text),
//!         ContentBlock::ChartRef(chart) => {
//!             let model = chart.model(&resolver);
//!             println!("{} chart with {} series", model.kind, model.series.len());
//!         },
//!         other => println!("{}", other.kind()),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Errors, geometry and unit conversions shared by every stage
pub mod common;

/// Layout and rendering settings
pub mod config;

/// File-level conversion and batches
pub mod convert;

/// Normalized document model: content blocks, charts, rendered images
pub mod document;

/// Page composition
pub mod layout;

/// OOXML packages, WordprocessingML bodies and DrawingML charts
pub mod ooxml;

/// The conversion driver
pub mod pipeline;

/// Chart rasterization
pub mod render;

/// Page sinks: in-memory recording and PDF
pub mod sink;

pub use common::{Error, Result};
pub use config::RenderConfig;
pub use ooxml::docx::Package as DocxPackage;
pub use pipeline::{ConversionReport, Converter};
