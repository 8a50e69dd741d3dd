/// WordprocessingML (.docx) reading.
///
/// - [`Package`]: an OPC package with a Word main document part
/// - [`body`]: parser from `word/document.xml` to a closed node tree
/// - [`ContentWalker`]: node tree to ordered content blocks
pub mod body;
pub mod package;
pub mod walker;

pub use body::{BodyNode, DrawingNode, Graphic, ParagraphNode, ParsedBody, RunItem};
pub use package::Package;
pub use walker::ContentWalker;
