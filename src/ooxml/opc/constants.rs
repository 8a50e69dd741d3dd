/// Constant values related to the Open Packaging Convention.
///
/// Content types, relationship types and namespaces the pipeline needs to
/// recognise the parts of a WordprocessingML package.

/// Content type URIs (like MIME-types) that specify a part's format
pub mod content_type {
    // Image content types
    pub const BMP: &str = "image/bmp";
    pub const GIF: &str = "image/gif";
    pub const JPEG: &str = "image/jpeg";
    pub const PNG: &str = "image/png";
    pub const TIFF: &str = "image/tiff";
    pub const X_EMF: &str = "image/x-emf";
    pub const X_WMF: &str = "image/x-wmf";

    // DrawingML content types
    pub const DML_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";

    // WordprocessingML content types
    pub const WML_DOCUMENT_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const WML_DOCUMENT_MACRO_MAIN: &str = "application/vnd.ms-word.document.macroEnabled.main+xml";
    pub const WML_TEMPLATE_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
    pub const WML_TEMPLATE_MACRO_MAIN: &str = "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";

    // Package content types
    pub const OPC_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";

    /// Content types accepted for the main part of a word-processing package.
    pub const WML_MAIN_TYPES: [&str; 4] = [
        WML_DOCUMENT_MAIN,
        WML_DOCUMENT_MACRO_MAIN,
        WML_TEMPLATE_MAIN,
        WML_TEMPLATE_MACRO_MAIN,
    ];
}

/// Relationship target modes
pub mod target_mode {
    pub const INTERNAL: &str = "Internal";
    pub const EXTERNAL: &str = "External";
}

/// Relationship type URIs
pub mod relationship_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const CHART: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

    // ISO/IEC 29500 Strict spellings of the same types
    pub const STRICT_OFFICE_DOCUMENT: &str = "http://purl.oclc.org/ooxml/officeDocument/relationships/officeDocument";
    pub const STRICT_IMAGE: &str = "http://purl.oclc.org/ooxml/officeDocument/relationships/image";
    pub const STRICT_CHART: &str = "http://purl.oclc.org/ooxml/officeDocument/relationships/chart";

    #[inline]
    pub fn is_office_document(reltype: &str) -> bool {
        reltype == OFFICE_DOCUMENT || reltype == STRICT_OFFICE_DOCUMENT
    }

    #[inline]
    pub fn is_image(reltype: &str) -> bool {
        reltype == IMAGE || reltype == STRICT_IMAGE
    }

    #[inline]
    pub fn is_chart(reltype: &str) -> bool {
        reltype == CHART || reltype == STRICT_CHART
    }
}

/// `a:graphicData/@uri` values identifying the payload of a drawing
pub mod graphic_data {
    pub const PICTURE: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
    pub const CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
}
