//! Error types for DSD document population.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while populating a DSD document.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The input format is not supported or could not be detected.
    #[error("Unsupported or unrecognized format: {0}")]
    UnsupportedFormat(String),

    /// A model response could not be parsed into the expected record shape.
    ///
    /// The original response text is attached for diagnosis; this failure is
    /// always fatal to the current operation.
    #[error("Malformed model response ({reason}): {raw:.500}")]
    MalformedResponse {
        /// What went wrong during parsing.
        reason: String,
        /// The original raw response text.
        raw: String,
    },

    /// Failed to parse the PPTX file structure.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// HTTP transport failure talking to an external API.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// An external API accepted the request but returned an error payload.
    #[error("API error: {0}")]
    ApiError(String),

    /// Google Slides API error.
    #[error("Google Slides error: {0}")]
    SlidesApiError(String),

    /// A document-level operation failed (no document loaded, bad slide index).
    #[error("Document error: {0}")]
    DocumentError(String),
}
