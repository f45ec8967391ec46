//! Response bodies produced by the extraction pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message returned when the model output cannot be parsed as JSON.
pub const INVALID_JSON_MESSAGE: &str = "OpenAI response was not valid JSON.";

/// Message returned when strict schema checking rejects the model output.
pub const SCHEMA_MISMATCH_MESSAGE: &str = "OpenAI response did not match the invoice schema.";

/// A failed extraction, serialized as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: String,
}

impl ErrorResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Outcome of one extraction.
///
/// Serializes as the parsed model JSON on success and as an [`ErrorResult`]
/// otherwise, so callers branch on the presence of an `error` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionOutcome {
    /// The model JSON, unchanged.
    Parsed(Value),
    /// Any stage failed.
    Failed(ErrorResult),
}

impl ExtractionOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(ErrorResult::new(message))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Convert into a JSON body.
    pub fn into_value(self) -> Value {
        match self {
            Self::Parsed(value) => value,
            Self::Failed(err) => serde_json::json!({ "error": err.error }),
        }
    }
}
