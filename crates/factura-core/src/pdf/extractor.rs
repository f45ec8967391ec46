//! PDF text extraction using lopdf, with pdf-extract as a fallback.

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;

/// PDF text extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    max_pages: usize,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Type of PDF content.
    pub pdf_type: PdfType,
    /// Text of all pages, in page order.
    pub text: String,
    /// Pages with their content.
    pub pages: Vec<PdfPage>,
}

/// Content from a single PDF page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            max_pages: 0,
        }
    }

    /// Limit how many pages are read (0 = unlimited).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))
    }

    /// Page numbers to read, honouring the page cap.
    fn page_numbers(&self) -> Result<Vec<u32>> {
        let doc = self.document()?;
        let pages = doc.get_pages().into_keys();
        Ok(match self.max_pages {
            0 => pages.collect(),
            n => pages.take(n).collect(),
        })
    }

    /// Extract the text of every page in document order.
    ///
    /// Pages that cannot be decoded are skipped. When no page yields any
    /// text, the whole document is retried with pdf-extract, which handles
    /// some font encodings lopdf does not; that pass ignores the page cap.
    pub fn extract_all(&self) -> Result<PdfContent> {
        let numbers = self.page_numbers()?;
        if numbers.is_empty() {
            return Err(PdfError::NoPages);
        }

        let mut pages = Vec::with_capacity(numbers.len());
        let mut full_text = String::new();

        for number in numbers {
            let text = match self.extract_page_text(number) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping page {}: {}", number, e);
                    String::new()
                }
            };

            trace!("Page {}: {} chars", number, text.len());
            if !text.is_empty() {
                if !full_text.is_empty() && !full_text.ends_with('\n') {
                    full_text.push('\n');
                }
                full_text.push_str(&text);
            }

            pages.push(PdfPage { number, text });
        }

        if full_text.trim().is_empty() {
            match pdf_extract::extract_text_from_mem(&self.raw_data) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!("lopdf found no text, using pdf-extract result ({} chars)", text.len());
                    full_text = text;
                }
                Ok(_) => {}
                Err(e) => debug!("pdf-extract fallback failed: {}", e),
            }
        }

        let pdf_type = if full_text.trim().is_empty() {
            PdfType::Empty
        } else {
            PdfType::Text
        };

        debug!(
            "PDF analysis: {} pages, {} chars text -> {:?}",
            pages.len(),
            full_text.len(),
            pdf_type
        );

        Ok(PdfContent {
            pdf_type,
            text: full_text,
            pages,
        })
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

            // Keep the decrypted bytes for the pdf-extract fallback
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

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        if !doc.get_pages().contains_key(&page) {
            return Err(PdfError::InvalidPage(page));
        }

        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}
