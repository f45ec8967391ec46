//! Router setup.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let cors = setup_cors(&state.config.server.cors_origin)?;
    let body_limit = state.config.server.max_upload_bytes;

    Ok(Router::new()
        .route("/", get(handlers::root))
        .route("/api/parse", post(handlers::parse_invoice))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Allow one origin, any method and header from it, with credentials.
///
/// Wildcards cannot be combined with credentials, so methods and headers are
/// mirrored from the preflight request.
fn setup_cors(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("invalid CORS origin: {}", origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_cors_rejects_bad_origin() {
        assert!(setup_cors("http://localhost:5173").is_ok());
        assert!(setup_cors("http://bad\norigin").is_err());
    }
}
