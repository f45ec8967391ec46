//! HTTP service for LLM-backed invoice extraction.
//!
//! Exposes `GET /` as a liveness probe and `POST /api/parse`, which takes a
//! multipart PDF upload and answers with the extracted invoice fields.

pub mod app;
pub mod handlers;
pub mod staging;
pub mod state;

pub use app::router;
pub use state::AppState;
