/// Open Packaging Conventions (OPC) reader.
///
/// The container format shared by every Office Open XML document: a zip
/// archive of parts, a content type map and per-part relationship files.
pub mod constants;
pub mod content_types;
pub mod error;
pub mod package;
pub mod packuri;
pub mod rel;

pub use package::{OpcPackage, Part};
pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};
