use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::ChatMessage;
use crate::core::app::App;
use crate::core::completion::{CompletionBackend, CompletionError};
use crate::core::config::Config;

pub fn test_config() -> Config {
    Config {
        api_key: Some("test-key".to_string()),
        model: "test-model".to_string(),
        base_url: "https://api.test.com/v1".to_string(),
        log_file: None,
    }
}

pub fn create_test_app() -> App {
    create_test_app_with_backend(Arc::new(StaticBackend::new("Hi there")))
}

pub fn create_test_app_with_backend(backend: Arc<dyn CompletionBackend>) -> App {
    App::new(&test_config(), backend)
}

/// Backend that answers every request with the same reply and records
/// what it was asked.
pub struct StaticBackend {
    reply: String,
    requests: Mutex<Vec<(Vec<ChatMessage>, String)>>,
}

impl StaticBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(Vec<ChatMessage>, String)> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionBackend for StaticBackend {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<String, CompletionError> {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push((messages.to_vec(), model.to_string()));
        }
        Ok(self.reply.clone())
    }
}

pub struct FailingBackend {
    error: CompletionError,
}

impl FailingBackend {
    pub fn new(error: CompletionError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl CompletionBackend for FailingBackend {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _model: &str,
    ) -> Result<String, CompletionError> {
        Err(self.error.clone())
    }
}

pub struct PanickingBackend;

#[async_trait]
impl CompletionBackend for PanickingBackend {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _model: &str,
    ) -> Result<String, CompletionError> {
        panic!("backend exploded");
    }
}

/// Replies with `reply` only after `delay`, to exercise overlapping sends.
pub struct DelayedBackend {
    reply: String,
    delay: std::time::Duration,
}

impl DelayedBackend {
    pub fn new(reply: impl Into<String>, delay: std::time::Duration) -> Self {
        Self {
            reply: reply.into(),
            delay,
        }
    }
}

#[async_trait]
impl CompletionBackend for DelayedBackend {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _model: &str,
    ) -> Result<String, CompletionError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.clone())
    }
}
