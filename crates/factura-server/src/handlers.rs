//! HTTP request handlers.
//!
//! Every handler answers `200 OK` with a JSON body; failures are reported as
//! `{"error": "..."}` and callers branch on that key.

use std::any::Any;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use factura_core::ExtractionOutcome;
use serde_json::{json, Value};
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::staging::StagedUpload;
use crate::state::AppState;

/// Body of the liveness probe.
pub const ROOT_MESSAGE: &str = "✅ Backend is running and CORS-enabled";

/// Error returned when the form carries no file.
pub const NO_FILE_MESSAGE: &str = "No file uploaded.";

/// Multipart field the frontend sends the document in.
const FILE_FIELD: &str = "file";

/// A document received in a multipart form.
#[derive(Debug)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({ "message": ROOT_MESSAGE }))
}

/// `POST /api/parse`
pub async fn parse_invoice(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<Value> {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            warn!("Rejected non-multipart request: {}", rejection);
            return Json(ExtractionOutcome::failed(rejection.body_text()).into_value());
        }
    };

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("parse", %request_id);

    let outcome = handle_upload(&state, request_id, multipart)
        .instrument(span)
        .await;
    Json(outcome.into_value())
}

async fn handle_upload(
    state: &AppState,
    request_id: Uuid,
    mut multipart: Multipart,
) -> ExtractionOutcome {
    let upload = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return ExtractionOutcome::failed(NO_FILE_MESSAGE),
        Err(e) => {
            warn!("Failed to read upload: {}", e);
            return ExtractionOutcome::failed(e.body_text());
        }
    };

    info!(
        "Received file: {}, type: {}, {} bytes",
        upload.file_name.as_deref().unwrap_or("<unnamed>"),
        upload.content_type.as_deref().unwrap_or("<unknown>"),
        upload.data.len()
    );

    let staged = match StagedUpload::write(&state.staging_dir(), request_id, &upload.data).await {
        Ok(staged) => staged,
        Err(e) => {
            error!("Failed to stage upload: {}", e);
            return ExtractionOutcome::failed(e.to_string());
        }
    };
    drop(upload);

    let extracted = state.extractor.extract_file(staged.path()).await;
    drop(staged);

    match extracted {
        Ok(content) => {
            info!("Extracted text length: {}", content.text.len());
            state.extractor.process_content(&content).await
        }
        Err(e) => {
            warn!("Text extraction failed: {}", e);
            ExtractionOutcome::failed(e.to_string())
        }
    }
}

/// Read the document from the form: the `file` field, or failing that the
/// first field carrying a filename.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<UploadedDocument>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        let is_file = field.name() == Some(FILE_FIELD) || field.file_name().is_some();
        if !is_file {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        return Ok(Some(UploadedDocument {
            file_name,
            content_type,
            data,
        }));
    }
    Ok(None)
}

/// Turn a handler panic into the usual error body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unexpected error".to_string()
    };

    error!("Request handler panicked: {}", message);
    Json(json!({ "error": message })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_response_message() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let response = panic_response(Box::new(42u8));
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
