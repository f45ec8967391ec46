//! Configuration structures for the extraction service.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable holding the upstream API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Fallback credential variable shared with the web frontend's `.env`.
pub const API_KEY_FALLBACK_ENV: &str = "VITE_OPENAI_API_KEY";

/// Main configuration for factura.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacturaConfig {
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// Completion API configuration.
    pub upstream: UpstreamConfig,

    /// Extraction pipeline configuration.
    pub extraction: ExtractionConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,

    /// The single origin allowed by CORS.
    pub cors_origin: String,

    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,

    /// Directory for staged uploads (system temp dir when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            cors_origin: "http://localhost:5173".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
            staging_dir: None,
        }
    }
}

impl ServerConfig {
    /// Directory uploads are staged in.
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Completion API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Per-attempt request timeout in seconds.
    pub timeout_secs: u64,

    /// Retries after the first attempt for throttled, 5xx or transport failures.
    pub max_retries: u32,

    /// First backoff delay; doubles on every retry.
    pub retry_base_delay_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            timeout_secs: 60,
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

/// Extraction pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,

    /// Reject model JSON that does not match the invoice schema.
    pub strict_schema: bool,
}

impl FacturaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`.
    ///
    /// Supported keys:
    /// - `FACTURA_BIND`
    /// - `FACTURA_CORS_ORIGIN`
    /// - `FACTURA_STAGING_DIR`
    /// - `FACTURA_STRICT_SCHEMA`: "true" or "false"
    /// - `OPENAI_BASE_URL`
    /// - `OPENAI_MODEL`
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("FACTURA_BIND") {
            self.server.bind = bind;
        }
        if let Some(origin) = lookup("FACTURA_CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
        if let Some(dir) = lookup("FACTURA_STAGING_DIR") {
            self.server.staging_dir = Some(PathBuf::from(dir));
        }
        if let Some(strict) = lookup("FACTURA_STRICT_SCHEMA") {
            self.extraction.strict_schema = match strict.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Value {
                        key: "FACTURA_STRICT_SCHEMA".to_string(),
                        value: strict,
                    })
                }
            };
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.upstream.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.upstream.model = model;
        }
        Ok(self)
    }
}

/// Resolve the API credential from the process environment.
pub fn api_key_from_env() -> Result<String, ConfigError> {
    resolve_api_key(|key| std::env::var(key).ok())
}

/// Resolve the API credential, preferring [`API_KEY_ENV`] over
/// [`API_KEY_FALLBACK_ENV`]. Blank values count as missing.
pub fn resolve_api_key<F>(lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    [API_KEY_ENV, API_KEY_FALLBACK_ENV]
        .into_iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .ok_or(ConfigError::MissingApiKey(API_KEY_ENV))
}
