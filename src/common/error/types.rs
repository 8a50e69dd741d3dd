use std::path::PathBuf;

use thiserror::Error;

/// Main error type for conversions.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The source document could not be read
    #[error("Cannot read {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output artifact could not be written
    #[error("Cannot write {}: {source}", path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is a document family the pipeline does not read
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Part not found in the package
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// Invalid content type
    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// Invalid render configuration
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The output sink rejected a page or failed to encode it
    #[error(transparent)]
    Sink(#[from] crate::sink::SinkError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for conversions.
pub type Result<T> = std::result::Result<T, Error>;
