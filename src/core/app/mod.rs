use std::sync::Arc;

use crate::core::completion::{CompletionBackend, OpenAiClient};
use crate::core::config::Config;
use crate::core::message::Transcript;
use crate::ui::theme::Theme;

pub mod actions;
pub mod session;
pub mod ui_state;

pub use actions::{
    apply_action, apply_actions, AppAction, AppActionContext, AppActionDispatcher,
    AppActionEnvelope, AppCommand, ScrollDelta,
};
pub use session::SessionContext;
pub use ui_state::{StatusLabel, UiFocus, UiState};

/// Everything the chat loop mutates: request bookkeeping, pane state and the
/// conversation history. Owned by the loop and reached through its handle.
pub struct App {
    pub session: SessionContext,
    pub ui: UiState,
    pub transcript: Transcript,
}

impl App {
    pub fn new(config: &Config, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            session: SessionContext::new(backend, config.model.clone()),
            ui: UiState::new(Theme::neon()),
            transcript: Transcript::new(),
        }
    }

    /// App talking to the OpenAI-compatible endpoint named in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, Arc::new(OpenAiClient::new(config)))
    }

    pub fn status(&self) -> StatusLabel {
        self.ui.status
    }
}
