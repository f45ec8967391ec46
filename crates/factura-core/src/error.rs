//! Error types for the factura-core library.

use thiserror::Error;

/// Main error type for the factura library.
#[derive(Error, Debug)]
pub enum FacturaError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Upstream completion API error.
    #[error("upstream error: {0}")]
    Client(#[from] ClientError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking extraction task panicked or was cancelled.
    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised while talking to the completion API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The API answered 2xx but without a usable choice.
    #[error("API response contained no completion choice")]
    EmptyResponse,
}

impl ClientError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(e) => !e.is_builder() && !e.is_decode(),
            ClientError::Api { status, .. } => *status == 429 || *status >= 500,
            ClientError::EmptyResponse => false,
        }
    }
}

/// Errors related to loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The API credential is absent from the environment.
    #[error("{0} is not set; export it or add it to a .env file")]
    MissingApiKey(&'static str),

    /// The configuration file could not be read or written.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for this schema.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),

    /// An override or setting has an unusable value.
    #[error("invalid value for {key}: {value}")]
    Value { key: String, value: String },
}

/// Result type for the factura library.
pub type Result<T> = std::result::Result<T, FacturaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_retryable() {
        let throttled = ClientError::Api { status: 429, message: "slow down".into() };
        let unavailable = ClientError::Api { status: 503, message: "down".into() };
        let unauthorized = ClientError::Api { status: 401, message: "bad key".into() };

        assert!(throttled.is_retryable());
        assert!(unavailable.is_retryable());
        assert!(!unauthorized.is_retryable());
        assert!(!ClientError::EmptyResponse.is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let err = FacturaError::from(PdfError::Parse("Invalid file header".into()));
        assert_eq!(err.to_string(), "PDF error: failed to parse PDF: Invalid file header");

        let err = ConfigError::MissingApiKey("OPENAI_API_KEY");
        assert!(err.to_string().starts_with("OPENAI_API_KEY is not set"));
    }
}
