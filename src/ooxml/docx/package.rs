/// Package implementation for Word documents.
use crate::document::ContentBlock;
use crate::ooxml::docx::body::{ParsedBody, parse_body};
use crate::ooxml::docx::walker::ContentWalker;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::{OpcPackage, Part};
use bytes::Bytes;
use std::io::{Read, Seek};
use std::path::Path;

/// A Word (.docx) package.
///
/// Wraps an OPC package whose main part is a WordprocessingML document.
///
/// # Examples
///
/// ```rust,no_run
/// use longan::ooxml::docx::Package;
///
/// let pkg = Package::open("report.docx")?;
/// for block in pkg.content()? {
///     println!("{}", block.kind());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Package {
    opc: OpcPackage,
}

impl Package {
    /// Open a .docx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    /// Create a .docx package from a reader (must implement Read + Seek).
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_opc(OpcPackage::from_reader(reader)?)
    }

    /// Verify the main part is a word-processing document.
    pub fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main_part = opc
            .main_document_part()
            .map_err(|e| OoxmlError::PartNotFound(format!("main document part: {}", e)))?;

        let content_type = main_part.content_type();
        if !ct::WML_MAIN_TYPES.contains(&content_type) {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::WML_DOCUMENT_MAIN.to_string(),
                got: content_type.to_string(),
            });
        }

        Ok(Self { opc })
    }

    #[inline]
    pub fn opc(&self) -> &OpcPackage {
        &self.opc
    }

    pub fn main_part(&self) -> Result<&Part> {
        Ok(self.opc.main_document_part()?)
    }

    /// Parse `w:body` of the main document part.
    pub fn body(&self) -> Result<ParsedBody> {
        parse_body(self.main_part()?.blob())
    }

    /// The document as an ordered sequence of content blocks.
    ///
    /// When the body XML breaks off partway, the blocks before the break are
    /// kept and a single annotation stands in for the unreadable rest.
    pub fn content(&self) -> Result<Vec<ContentBlock>> {
        let main = self.main_part()?;
        let body = parse_body(main.blob())?;
        let mut blocks = ContentWalker::new(&self.opc, main).walk(&body.nodes);
        if let Some(err) = body.error {
            log::warn!("document body is malformed after {} blocks: {}", blocks.len(), err);
            blocks.push(ContentBlock::Annotation(format!(
                "Could not read the rest of the document: {}",
                err
            )));
        }
        Ok(blocks)
    }
}
