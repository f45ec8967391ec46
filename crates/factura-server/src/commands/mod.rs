pub mod config;
pub mod parse;
pub mod serve;

use std::path::{Path, PathBuf};

use factura_core::FacturaConfig;
use tracing::debug;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("factura")
        .join("config.json")
}

/// Load configuration from `path`, else the default file if present, else
/// defaults; environment overrides are applied last.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FacturaConfig> {
    let config = match path {
        Some(path) => FacturaConfig::from_file(path)?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                debug!("Loading config from {}", default_path.display());
                FacturaConfig::from_file(&default_path)?
            } else {
                FacturaConfig::default()
            }
        }
    };

    Ok(config.with_env_overrides()?)
}
