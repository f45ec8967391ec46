//! PDF processing module.

mod extractor;
#[cfg(any(test, feature = "test-util"))]
pub mod fixtures;

pub use extractor::{PdfContent, PdfExtractor, PdfPage};

use crate::error::PdfError;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// No extractable text (scanned images, blank pages).
    Empty,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;
}

/// Load `data` and extract its text, reading at most `max_pages` pages
/// (0 = all).
pub fn extract_document(data: &[u8], max_pages: usize) -> Result<PdfContent> {
    let mut extractor = PdfExtractor::new().with_max_pages(max_pages);
    extractor.load(data)?;
    extractor.extract_all()
}
