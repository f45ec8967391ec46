//! Parsing of raw model replies.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::invoice::InvoiceEnvelope;
use crate::models::outcome::{ExtractionOutcome, INVALID_JSON_MESSAGE, SCHEMA_MISMATCH_MESSAGE};

/// Turns a raw model reply into an [`ExtractionOutcome`]. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator {
    strict_schema: bool,
}

impl ResponseValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also require the reply to deserialize into [`InvoiceEnvelope`].
    pub fn with_strict_schema(mut self, strict: bool) -> Self {
        self.strict_schema = strict;
        self
    }

    /// Parse `raw` as JSON and return it unchanged.
    ///
    /// Parse errors are logged; the caller only sees a fixed message.
    pub fn validate(&self, raw: &str) -> ExtractionOutcome {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("JSON parsing error: {}", e);
                debug!("Rejected model output: {}", raw);
                return ExtractionOutcome::failed(INVALID_JSON_MESSAGE);
            }
        };

        if self.strict_schema {
            if let Err(e) = InvoiceEnvelope::deserialize(&value) {
                warn!("Model output does not match the invoice schema: {}", e);
                return ExtractionOutcome::failed(SCHEMA_MISMATCH_MESSAGE);
            }
        }

        ExtractionOutcome::Parsed(value)
    }
}
