//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use factura_core::{CompletionClient, FacturaConfig, InvoiceExtractor, OpenAiClient};

/// Read-only state shared by every request handler.
pub struct AppState {
    pub config: FacturaConfig,
    pub extractor: InvoiceExtractor,
}

impl AppState {
    /// Build state around an existing completion client.
    pub fn new(config: FacturaConfig, client: Arc<dyn CompletionClient>) -> Self {
        let extractor = InvoiceExtractor::new(client).with_config(&config.extraction);
        Self { config, extractor }
    }

    /// Build state with an OpenAI client authenticated by `api_key`.
    pub fn with_api_key(config: FacturaConfig, api_key: String) -> factura_core::Result<Self> {
        let client = OpenAiClient::new(api_key, &config.upstream)?;
        tracing::debug!("Using model {} at {}", client.model(), config.upstream.base_url);
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Directory uploads are staged in.
    pub fn staging_dir(&self) -> PathBuf {
        self.config.server.staging_dir()
    }
}
