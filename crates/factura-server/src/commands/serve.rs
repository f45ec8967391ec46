//! Serve command - run the HTTP service.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::info;

use factura_core::models::config::api_key_from_env;
use factura_server::{router, AppState};

use super::load_config;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Allowed CORS origin (overrides config)
    #[arg(long)]
    cors_origin: Option<String>,
}

pub async fn run(args: ServeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(origin) = args.cors_origin {
        config.server.cors_origin = origin;
    }

    // Refuse to start without an API key
    let api_key = api_key_from_env()?;

    let bind = config.server.bind.clone();
    let state = Arc::new(AppState::with_api_key(config, api_key)?);
    let app = router(state.clone())?;

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;

    info!(
        "Staging uploads in {}, model {}",
        state.staging_dir().display(),
        state.config.upstream.model
    );
    println!(
        "{} Listening on http://{} (CORS origin {})",
        style("✓").green(),
        listener.local_addr()?,
        state.config.server.cors_origin
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
