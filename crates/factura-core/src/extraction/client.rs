//! Client for OpenAI-compatible chat completion APIs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::models::config::UpstreamConfig;

/// Result type for completion calls.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Longest delay honoured from a `Retry-After` header.
const MAX_RETRY_AFTER_SECS: u64 = 60;

/// Trait for text-generation backends.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `system` and `prompt` and return the trimmed text of the reply.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// A failed attempt and the server's requested wait, if any.
struct AttemptError {
    error: ClientError,
    retry_after: Option<Duration>,
}

impl From<reqwest::Error> for AttemptError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            error: ClientError::Transport(err),
            retry_after: None,
        }
    }
}

/// Chat completion client with deterministic sampling and bounded retries.
///
/// Built once at startup and shared by every request.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_retries: u32,
    retry_base_delay_ms: u64,
}

impl OpenAiClient {
    /// Create a client for `config`, authenticating with `api_key`.
    pub fn new(api_key: impl Into<String>, config: &UpstreamConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_retries: config.max_retries,
            retry_base_delay_ms: config.retry_base_delay_ms,
        })
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn send_once(&self, request: &ChatRequest<'_>) -> std::result::Result<String, AttemptError> {
        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);

            return Err(AttemptError {
                error: ClientError::Api {
                    status: status.as_u16(),
                    message,
                },
                retry_after,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or(AttemptError {
                error: ClientError::EmptyResponse,
                retry_after: None,
            })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.0,
        };

        let mut attempt = 0;
        loop {
            match self.send_once(&request).await {
                Ok(text) => {
                    debug!("Completion received ({} chars, attempt {})", text.len(), attempt + 1);
                    return Ok(text);
                }
                Err(failed) if attempt < self.max_retries && failed.error.is_retryable() => {
                    let delay = failed
                        .retry_after
                        .unwrap_or_else(|| backoff_delay(attempt, self.retry_base_delay_ms));
                    warn!(
                        "Completion attempt {} failed: {}; retrying in {:?}",
                        attempt + 1,
                        failed.error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failed) => return Err(failed.error),
            }
        }
    }
}

/// Parse a `Retry-After` header given in seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS)))
}

/// Exponential backoff delay for a given attempt.
fn backoff_delay(attempt: u32, base_ms: u64) -> Duration {
    let delay_ms = base_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay_ms.min(60_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config(server: &mockito::Server, max_retries: u32) -> UpstreamConfig {
        UpstreamConfig {
            base_url: format!("{}/v1", server.url()),
            model: "gpt-4".to_string(),
            timeout_secs: 5,
            max_retries,
            retry_base_delay_ms: 1,
        }
    }

    fn completion_body(content: &str) -> String {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
            ]
        })
        .to_string()
    }

    #[test]
    fn test_backoff_delay() {
        assert_eq!(backoff_delay(0, 500), Duration::from_millis(500));
        assert_eq!(backoff_delay(2, 500), Duration::from_millis(2000));
        assert_eq!(backoff_delay(30, 500), Duration::from_millis(60_000));
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, "3".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(3)));

        headers.insert(RETRY_AFTER, "3600".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_sends_deterministic_request_and_trims_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4",
                "temperature": 0.0,
                "messages": [
                    { "role": "system", "content": "be strict" },
                    { "role": "user", "content": "extract this" }
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("\n  {\"invoice\": {}}  \n"))
            .create_async()
            .await;

        let client = OpenAiClient::new("sk-test", &config(&server, 0)).unwrap();
        let reply = client.complete("be strict", "extract this").await.unwrap();

        assert_eq!(reply, "{\"invoice\": {}}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_does_not_retry_auth_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": {"message": "Incorrect API key provided"}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = OpenAiClient::new("sk-bad", &config(&server, 3)).unwrap();
        let err = client.complete("s", "p").await.unwrap_err();

        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {other}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retries_server_errors_up_to_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .with_body("upstream unavailable")
            .expect(3)
            .create_async()
            .await;

        let client = OpenAiClient::new("sk-test", &config(&server, 2)).unwrap();
        let err = client.complete("s", "p").await.unwrap_err();

        assert!(matches!(err, ClientError::Api { status: 503, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_recovers_after_throttling() {
        let mut server = mockito::Server::new_async().await;
        let throttled = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_header("retry-after", "0")
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(completion_body("{}"))
            .expect(1)
            .create_async()
            .await;

        let client = OpenAiClient::new("sk-test", &config(&server, 1)).unwrap();
        assert_eq!(client.complete("s", "p").await.unwrap(), "{}");

        throttled.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new("sk-test", &config(&server, 2)).unwrap();
        assert!(matches!(
            client.complete("s", "p").await,
            Err(ClientError::EmptyResponse)
        ));
    }
}
