//! PDF text source.
//!
//! Only embedded text is read. Image-only (scanned) documents are detected
//! and yield no text.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// What a PDF carries, judged from its text length and image objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    Text,
    /// Scanned pages with no usable text layer.
    Image,
    /// Text layer alongside embedded images (logos, signatures).
    Hybrid,
    Empty,
}

impl PdfType {
    /// Whether the document carries text worth parsing.
    pub fn has_text(&self) -> bool {
        matches!(self, PdfType::Text | PdfType::Hybrid)
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// A loaded document that lab text can be read from.
pub trait PdfProcessor {
    /// Parse the document. Empty-password encryption is removed; anything
    /// else encrypted is rejected.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Pages in the loaded document; 0 before `load`.
    fn page_count(&self) -> u32;

    fn analyze(&self) -> PdfType;

    /// Text of all pages (or the first `max_pages`), in page order.
    fn extract_text(&self) -> Result<String>;

    /// Text of one 1-indexed page.
    fn extract_page_text(&self, page: u32) -> Result<String>;
}
