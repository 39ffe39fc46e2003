//! Error types for slide generation and export.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating, exporting or storing data.
///
/// Slide assembly itself never fails; these cover the edges around it.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The slide request failed validation.
    #[error("Invalid slide request: {0}")]
    InvalidRequest(String),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing or parsing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// The file is not a presentation package we can read.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),
}
