//! Errors raised by the document and configuration layers.
//!
//! Field extraction itself has no error path: a field that cannot be
//! resolved is simply absent from the result.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabscanError {
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed config file or JSON output failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings that parse but cannot be applied, e.g. an inverted clamp range.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Reasons a PDF yields no text.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("unreadable PDF: {0}")]
    Parse(String),

    #[error("text layer could not be decoded: {0}")]
    TextExtraction(String),

    /// Encrypted with a non-empty password.
    #[error("PDF is password protected")]
    Encrypted,

    #[error("PDF has no pages")]
    NoPages,

    /// Page number outside `1..=page_count`.
    #[error("page {0} does not exist")]
    InvalidPage(u32),
}

pub type Result<T> = std::result::Result<T, LabscanError>;
