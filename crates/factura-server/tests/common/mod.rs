//! Test helpers: build AppState and router for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use factura_core::models::config::FacturaConfig;
use factura_core::{ClientError, CompletionClient};
use factura_server::{router, AppState};
use tempfile::TempDir;

pub use factura_core::pdf::fixtures::build_pdf;

/// Test application: server plus the staging directory it writes to.
pub struct TestApp {
    pub server: TestServer,
    pub staging: TempDir,
}

impl TestApp {
    /// Files left behind in the staging directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging.path()).unwrap().count()
    }
}

/// Config staging uploads in `staging`, with fast retries.
pub fn test_config(staging: &Path) -> FacturaConfig {
    let mut config = FacturaConfig::default();
    config.server.staging_dir = Some(staging.to_path_buf());
    config.upstream.retry_base_delay_ms = 1;
    config.upstream.timeout_secs = 5;
    config
}

/// Build a test app around `client`.
pub fn spawn_with_client(client: Arc<dyn CompletionClient>) -> TestApp {
    spawn_configured(|config| AppState::new(config, client), |_| {})
}

/// Build a test app with a real OpenAI client talking to `base_url`.
pub fn spawn_with_upstream(base_url: String) -> TestApp {
    spawn_configured(
        |config| AppState::with_api_key(config, "sk-test".to_string()).unwrap(),
        |config| config.upstream.base_url = base_url,
    )
}

/// Build a test app, adjusting the config before the state is built.
pub fn spawn_configured<F, C>(build: F, configure: C) -> TestApp
where
    F: FnOnce(FacturaConfig) -> AppState,
    C: FnOnce(&mut FacturaConfig),
{
    let staging = tempfile::tempdir().unwrap();
    let mut config = test_config(staging.path());
    configure(&mut config);

    let app = router(Arc::new(build(config))).expect("Failed to setup routes");
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp { server, staging }
}

/// Replies with a canned answer, counting calls.
pub struct StubClient {
    reply: Result<String, u16>,
    calls: AtomicUsize,
}

impl StubClient {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for StubClient {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(status) => Err(ClientError::Api {
                status: *status,
                message: "The server had an error while processing your request.".to_string(),
            }),
        }
    }
}
