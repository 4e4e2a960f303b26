//! PDF text extraction using lopdf and pdf-extract.

use lopdf::{Document, Object};
use tracing::{debug, trace};

use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;

/// PDF text extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    min_text_length: usize,
    max_pages: usize,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            min_text_length: 50,
            max_pages: 0,
        }
    }

    /// Set the minimum text length for a document to count as text-based.
    pub fn with_min_text_length(mut self, min_text_length: usize) -> Self {
        self.min_text_length = min_text_length;
        self
    }

    /// Limit the number of pages read (0 = unlimited).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    fn pages_to_read(&self, doc: &Document) -> u32 {
        let total = doc.get_pages().len();
        let limited = if self.max_pages == 0 {
            total
        } else {
            total.min(self.max_pages)
        };
        limited as u32
    }

    fn classify(&self, text_len: usize, images: usize) -> PdfType {
        let has_text = text_len >= self.min_text_length;
        match (has_text, images > 0) {
            (true, false) => PdfType::Text,
            (false, true) => PdfType::Image,
            (true, true) => PdfType::Hybrid,
            (false, false) => PdfType::Empty,
        }
    }

    /// Count image XObjects without decoding them.
    fn count_images(&self, doc: &Document) -> usize {
        doc.objects
            .values()
            .filter(|object| match object {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|s| s.as_name())
                    .map(|name| name == b"Image")
                    .unwrap_or(false),
                _ => false,
            })
            .count()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn analyze(&self) -> PdfType {
        let Ok(doc) = self.document() else {
            return PdfType::Empty;
        };
        let text_len = self.extract_text().map(|t| t.trim().len()).unwrap_or(0);
        let pdf_type = self.classify(text_len, self.count_images(doc));
        debug!("PDF analysis: {} chars text -> {:?}", text_len, pdf_type);
        pdf_type
    }

    fn extract_text(&self) -> Result<String> {
        let doc = self.document()?;
        if self.max_pages != 0 && doc.get_pages().len() > self.max_pages {
            let pages: Vec<String> = (1..=self.pages_to_read(doc))
                .map(|p| self.extract_page_text(p).unwrap_or_default())
                .collect();
            return Ok(pages.join("\n"));
        }

        // pdf-extract panics on some malformed font tables
        let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&self.raw_data))
            .map_err(|_| PdfError::TextExtraction("decoder panicked".to_string()))?
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        trace!("pdf-extract produced {} chars", text.len());
        Ok(text)
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }
        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert_eq!(extractor.analyze(), PdfType::Empty);
    }

    #[test]
    fn test_load_garbage_fails() {
        let mut extractor = PdfExtractor::new();
        let err = extractor.load(b"not a pdf at all").unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_extract_without_document() {
        let extractor = PdfExtractor::new();
        assert!(matches!(extractor.extract_text(), Err(PdfError::Parse(_))));
        assert!(matches!(extractor.extract_page_text(1), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_classify() {
        let extractor = PdfExtractor::new().with_min_text_length(10);
        assert_eq!(extractor.classify(100, 0), PdfType::Text);
        assert_eq!(extractor.classify(2, 3), PdfType::Image);
        assert_eq!(extractor.classify(100, 1), PdfType::Hybrid);
        assert_eq!(extractor.classify(0, 0), PdfType::Empty);
    }
}
