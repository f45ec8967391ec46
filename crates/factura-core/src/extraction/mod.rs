//! Invoice field extraction through a completion model.

mod client;
mod prompt;
mod validator;

pub use client::{CompletionClient, OpenAiClient};
pub use prompt::{build_prompt, SYSTEM_INSTRUCTION, TEXT_END_MARKER, TEXT_START_MARKER};
pub use validator::ResponseValidator;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{FacturaError, Result};
use crate::models::config::ExtractionConfig;
use crate::models::outcome::ExtractionOutcome;
use crate::pdf::{self, PdfContent, PdfType};

/// Chains text extraction, prompt building, the completion call and
/// response validation.
///
/// Holds no per-request state; one instance is shared by all requests.
#[derive(Clone)]
pub struct InvoiceExtractor {
    client: Arc<dyn CompletionClient>,
    validator: ResponseValidator,
    max_pages: usize,
}

impl InvoiceExtractor {
    /// Create an extractor using `client` with default settings.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            validator: ResponseValidator::new(),
            max_pages: 0,
        }
    }

    /// Apply page cap and schema strictness from `config`.
    pub fn with_config(mut self, config: &ExtractionConfig) -> Self {
        self.max_pages = config.max_pages;
        self.validator = self.validator.with_strict_schema(config.strict_schema);
        self
    }

    /// Read the PDF at `path` and extract its text.
    pub async fn extract_file(&self, path: &Path) -> Result<PdfContent> {
        let path: PathBuf = path.to_path_buf();
        let max_pages = self.max_pages;

        run_blocking(move || {
            let data = std::fs::read(&path)?;
            Ok(pdf::extract_document(&data, max_pages)?)
        })
        .await
    }

    /// Ask the model for the invoice fields in `text` and validate the reply.
    ///
    /// Only upstream failures are returned as errors; malformed replies
    /// become a failed outcome.
    pub async fn complete(&self, text: &str) -> Result<ExtractionOutcome> {
        let prompt = build_prompt(text);
        debug!("Prompt built ({} chars)", prompt.len());

        let raw = self.client.complete(SYSTEM_INSTRUCTION, &prompt).await?;
        debug!("Raw model output: {}", raw);

        Ok(self.validator.validate(&raw))
    }

    /// Run the whole pipeline on text that was already extracted.
    pub async fn process_content(&self, content: &PdfContent) -> ExtractionOutcome {
        if content.pdf_type == PdfType::Empty {
            warn!("No extractable text in document; sending empty text to the model");
        }

        match self.complete(&content.text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Extraction failed: {}", e);
                ExtractionOutcome::failed(e.to_string())
            }
        }
    }

    /// Run the whole pipeline on the PDF at `path`. Never fails.
    pub async fn process_file(&self, path: &Path) -> ExtractionOutcome {
        let start = Instant::now();

        let content = match self.extract_file(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Text extraction failed for {}: {}", path.display(), e);
                return ExtractionOutcome::failed(e.to_string());
            }
        };
        info!("Extracted text length: {}", content.text.len());

        let outcome = self.process_content(&content).await;
        debug!("Processed {} in {:?}", path.display(), start.elapsed());
        outcome
    }
}

/// Run `task` on the blocking pool. A panic inside it comes back as
/// [`FacturaError::Task`].
async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| FacturaError::Task(e.to_string()))?
}
