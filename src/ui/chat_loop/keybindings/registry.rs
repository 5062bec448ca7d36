//! Focus-aware keybinding registry.
//!
//! Bindings are looked up per [`KeyContext`]; keys without a binding fall
//! through to the prompt editor when the context accepts text.

use std::collections::HashMap;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::KeyLoopAction;
use crate::core::app::{AppActionDispatcher, UiFocus};
use crate::ui::chat_loop::AppHandle;

/// Result of handling a key event
#[derive(Debug, Clone, PartialEq)]
pub enum KeyResult {
    /// Key was handled and should continue the loop
    Continue,
    /// Key was handled and should exit the loop
    Exit,
    Handled,
    /// Key was not handled by this handler
    NotHandled,
}

impl From<KeyLoopAction> for KeyResult {
    fn from(action: KeyLoopAction) -> Self {
        match action {
            KeyLoopAction::Continue => KeyResult::Continue,
            KeyLoopAction::Break => KeyResult::Exit,
        }
    }
}

#[async_trait::async_trait]
pub trait KeyHandler: Send + Sync {
    async fn handle(
        &self,
        app: &AppHandle,
        dispatcher: &AppActionDispatcher,
        key: &KeyEvent,
        term_width: u16,
        term_height: u16,
    ) -> KeyResult;
}

/// Pattern for matching key events
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPattern {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyPattern {
    pub fn simple(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn alt(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::ALT,
        }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code && self.modifiers == key.modifiers
    }
}

impl From<&KeyEvent> for KeyPattern {
    fn from(key: &KeyEvent) -> Self {
        Self {
            code: key.code,
            modifiers: key.modifiers,
        }
    }
}

/// Which pane receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyContext {
    /// Prompt editor focused
    Input,
    /// Response pane focused; arrows scroll
    Output,
}

impl From<UiFocus> for KeyContext {
    fn from(focus: UiFocus) -> Self {
        match focus {
            UiFocus::Input => KeyContext::Input,
            UiFocus::Output => KeyContext::Output,
        }
    }
}

pub struct ModeAwareRegistry {
    handlers: HashMap<KeyContext, HashMap<KeyPattern, Box<dyn KeyHandler>>>,
}

impl ModeAwareRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register_for_context(
        &mut self,
        context: KeyContext,
        pattern: KeyPattern,
        handler: Box<dyn KeyHandler>,
    ) {
        self.handlers
            .entry(context)
            .or_default()
            .insert(pattern, handler);
    }

    pub fn has_binding(&self, key: &KeyEvent, context: KeyContext) -> bool {
        self.handlers
            .get(&context)
            .is_some_and(|bindings| bindings.contains_key(&KeyPattern::from(key)))
    }

    /// Whether the key bypasses the registry and goes to the prompt editor.
    ///
    /// With the prompt focused every unbound key is editing input. With the
    /// response pane focused only plain characters are, and typing one moves
    /// focus back to the prompt.
    pub fn should_handle_as_text_input(&self, key: &KeyEvent, context: KeyContext) -> bool {
        if self.has_binding(key, context) {
            return false;
        }
        match context {
            KeyContext::Input => true,
            KeyContext::Output => {
                matches!(key.code, KeyCode::Char(_))
                    && !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
            }
        }
    }

    pub async fn handle_key_event(
        &self,
        app: &AppHandle,
        dispatcher: &AppActionDispatcher,
        key: &KeyEvent,
        context: KeyContext,
        term_width: u16,
        term_height: u16,
    ) -> KeyResult {
        let Some(handler) = self
            .handlers
            .get(&context)
            .and_then(|bindings| bindings.get(&KeyPattern::from(key)))
        else {
            return KeyResult::NotHandled;
        };
        handler
            .handle(app, dispatcher, key, term_width, term_height)
            .await
    }
}

impl Default for ModeAwareRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating a fully configured mode-aware registry
pub struct ModeAwareBuilder {
    registry: ModeAwareRegistry,
}

impl ModeAwareBuilder {
    pub fn new() -> Self {
        Self {
            registry: ModeAwareRegistry::new(),
        }
    }

    pub fn build(self) -> ModeAwareRegistry {
        self.registry
    }

    pub fn register_for_context(
        mut self,
        context: KeyContext,
        pattern: KeyPattern,
        handler: Box<dyn KeyHandler>,
    ) -> Self {
        self.registry
            .register_for_context(context, pattern, handler);
        self
    }

    /// Same handler for both panes.
    pub fn register_everywhere<H>(self, pattern: KeyPattern, handler: H) -> Self
    where
        H: KeyHandler + Clone + 'static,
    {
        self.register_for_context(KeyContext::Input, pattern.clone(), Box::new(handler.clone()))
            .register_for_context(KeyContext::Output, pattern, Box::new(handler))
    }
}

impl Default for ModeAwareBuilder {
    fn default() -> Self {
        Self::new()
    }
}
