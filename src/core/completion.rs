//! Completion client: one request per send, errors folded into reply text.
//!
//! [`CompletionBackend`] is the seam to the remote service. Everything that
//! can go wrong behind it (missing key, transport, HTTP status, malformed
//! body, even a panicking backend) is turned into a `"<Service> error: ..."`
//! string by [`complete`], so callers only ever see a reply.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::config::Config;
use crate::core::constants::SERVICE_NAME;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    MissingApiKey,
    Transport(String),
    Status { code: u16, message: String },
    InvalidResponse(String),
    NoChoices,
    TaskFailed(String),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::MissingApiKey => write!(
                f,
                "no API key configured; set the OPENAI_API_KEY environment variable"
            ),
            CompletionError::Transport(message) => write!(f, "{message}"),
            CompletionError::Status { code, message } => {
                write!(f, "Error code: {code} - {message}")
            }
            CompletionError::InvalidResponse(message) => {
                write!(f, "invalid response body: {message}")
            }
            CompletionError::NoChoices => write!(f, "response contained no choices"),
            CompletionError::TaskFailed(message) => write!(f, "request task failed: {message}"),
        }
    }
}

impl std::error::Error for CompletionError {}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Name used as the prefix of error replies.
    fn service_name(&self) -> &str {
        SERVICE_NAME
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<String, CompletionError>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.chat_completions_url(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<String, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey)?;

        let request = ChatRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
        };

        debug!(
            endpoint = %self.endpoint,
            model,
            messages = request.messages.len(),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CompletionError::Status {
                code: status.as_u16(),
                message: summarize_error_body(&body),
            });
        }

        parse_reply(&body)
    }
}

fn parse_reply(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::NoChoices)?;
    Ok(choice.message.content.unwrap_or_default())
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Reduces an error body to one line, preferring the API's own message.
fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| extract_error_summary(&value))
        .filter(|summary| !summary.is_empty())
        .unwrap_or_else(|| trimmed.split_whitespace().collect::<Vec<_>>().join(" "))
}

pub fn format_service_error(service: &str, error: &CompletionError) -> String {
    format!("{service} error: {error}")
}

/// Runs one completion on a worker task and returns the reply text.
///
/// Never fails: errors and panics inside the backend come back as
/// `"<Service> error: <message>"`.
pub async fn complete(
    backend: Arc<dyn CompletionBackend>,
    messages: Vec<ChatMessage>,
    model: String,
) -> String {
    let service = backend.service_name().to_string();
    let worker = tokio::spawn(async move { backend.complete(&messages, &model).await });

    let error = match worker.await {
        Ok(Ok(reply)) => return reply,
        Ok(Err(error)) => error,
        Err(join_error) => CompletionError::TaskFailed(join_error.to_string()),
    };

    warn!(%error, "completion failed");
    format_service_error(&service, &error)
}

pub struct CompletionParams {
    pub backend: Arc<dyn CompletionBackend>,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub request_id: u64,
}

/// Reply for a single request, tagged with the id issued at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub request_id: u64,
    pub reply: String,
}

/// Spawns completion requests and funnels their replies into one channel
/// that the UI loop drains.
#[derive(Clone)]
pub struct CompletionService {
    tx: mpsc::UnboundedSender<CompletionOutcome>,
}

impl CompletionService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CompletionOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_completion(&self, params: CompletionParams) -> tokio::task::JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let CompletionParams {
                backend,
                model,
                messages,
                request_id,
            } = params;

            let reply = complete(backend, messages, model).await;
            debug!(request_id, bytes = reply.len(), "completion resolved");
            let _ = tx.send(CompletionOutcome { request_id, reply });
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{FailingBackend, PanickingBackend, StaticBackend};

    fn user_message(content: &str) -> Vec<ChatMessage> {
        vec![ChatMessage {
            role: "user".into(),
            content: content.into(),
        }]
    }

    #[tokio::test]
    async fn complete_returns_backend_reply() {
        let backend = Arc::new(StaticBackend::new("Hi there"));
        let reply = complete(backend.clone(), user_message("Hello"), "m".into()).await;
        assert_eq!(reply, "Hi there");

        let seen = backend.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, user_message("Hello"));
        assert_eq!(seen[0].1, "m");
    }

    #[tokio::test]
    async fn complete_stringifies_backend_errors() {
        let backend = Arc::new(FailingBackend::new(CompletionError::Status {
            code: 401,
            message: "Incorrect API key provided".into(),
        }));
        let reply = complete(backend, user_message("Hello"), "m".into()).await;
        assert_eq!(
            reply,
            "OpenAI error: Error code: 401 - Incorrect API key provided"
        );
    }

    #[tokio::test]
    async fn complete_survives_panicking_backend() {
        let reply = complete(Arc::new(PanickingBackend), user_message("Hello"), "m".into()).await;
        assert!(reply.starts_with("OpenAI error: request task failed"), "{reply}");
    }

    #[tokio::test]
    async fn missing_api_key_is_reported_without_network() {
        let config = Config::from_lookup(|_| None);
        let client = OpenAiClient::new(&config);
        let result = client.complete(&user_message("Hello"), "gpt-4o-mini").await;
        assert_eq!(result, Err(CompletionError::MissingApiKey));
    }

    #[tokio::test]
    async fn service_tags_outcomes_with_request_id() {
        let (service, mut rx) = CompletionService::new();
        let handle = service.spawn_completion(CompletionParams {
            backend: Arc::new(StaticBackend::new("pong")),
            model: "m".into(),
            messages: user_message("ping"),
            request_id: 7,
        });
        handle.await.expect("task joins");

        let outcome = rx.try_recv().expect("outcome delivered");
        assert_eq!(
            outcome,
            CompletionOutcome {
                request_id: 7,
                reply: "pong".into()
            }
        );
    }

    #[test]
    fn parse_reply_reads_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hi"}}]}"#;
        assert_eq!(parse_reply(body), Ok("Hi".to_string()));
    }

    #[test]
    fn parse_reply_rejects_empty_choices_and_garbage() {
        assert_eq!(
            parse_reply(r#"{"choices":[]}"#),
            Err(CompletionError::NoChoices)
        );
        assert!(matches!(
            parse_reply("<html>bad gateway</html>"),
            Err(CompletionError::InvalidResponse(_))
        ));
    }

    #[test]
    fn error_body_summary_prefers_api_message() {
        let body = r#"{"error":{"message":"model   overloaded","type":"server_error"}}"#;
        assert_eq!(summarize_error_body(body), "model overloaded");
        assert_eq!(summarize_error_body(r#"{"error":"quota"}"#), "quota");
        assert_eq!(summarize_error_body("  bad\ngateway "), "bad gateway");
        assert_eq!(summarize_error_body(""), "<empty body>");
    }
}
