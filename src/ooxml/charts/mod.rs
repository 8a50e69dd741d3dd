//! Charts embedded in word-processing documents.
//!
//! - [`reader`]: DrawingML chart part XML to the raw [`ChartPart`] model
//! - [`resolver`]: raw model to the renderer-facing
//!   [`ChartModel`](crate::document::ChartModel), cache first, never failing
//!
//! # Example
//!
//! ```rust
//! use longan::document::ChartKind;
//! use longan::ooxml::charts::ChartResolver;
//!
//! let xml = br#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart">
//!   <c:chart><c:plotArea><c:lineChart><c:ser>
//!     <c:tx><c:v>Visitors</c:v></c:tx>
//!     <c:cat><c:strLit><c:ptCount val="2"/>
//!       <c:pt idx="0"><c:v>Mon</c:v></c:pt><c:pt idx="1"><c:v>Tue</c:v></c:pt>
//!     </c:strLit></c:cat>
//!     <c:val><c:numLit><c:ptCount val="2"/>
//!       <c:pt idx="0"><c:v>120</c:v></c:pt><c:pt idx="1"><c:v>95</c:v></c:pt>
//!     </c:numLit></c:val>
//!   </c:ser></c:lineChart></c:plotArea></c:chart>
//! </c:chartSpace>"#;
//!
//! let model = ChartResolver::new().resolve(xml);
//! assert_eq!(model.kind, ChartKind::Line);
//! assert_eq!(model.series[0].values, [120.0, 95.0]);
//! ```

pub mod models;
pub mod reader;
pub mod resolver;

pub use models::{ChartPart, DataSource, DataSourceRef, PointCache, RawSeries, TypeGroup};
pub use reader::parse_chart_part;
pub use resolver::{ChartResolver, LiveDataSource, NoLiveData, ResolveError, ResolveMode};
