//! Core library for LLM-backed invoice extraction.
//!
//! This crate provides:
//! - PDF text extraction, page by page
//! - The fixed extraction prompt
//! - A chat completion client for OpenAI-compatible APIs
//! - Validation of the model's JSON reply
//! - Invoice data models and service configuration

pub mod error;
pub mod extraction;
pub mod models;
pub mod pdf;

pub use error::{ClientError, ConfigError, FacturaError, PdfError, Result};
pub use extraction::{CompletionClient, InvoiceExtractor, OpenAiClient, ResponseValidator};
pub use models::config::FacturaConfig;
pub use models::invoice::{Classification, InvoiceEnvelope, InvoiceRecord};
pub use models::outcome::{ErrorResult, ExtractionOutcome};
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, PdfType};
