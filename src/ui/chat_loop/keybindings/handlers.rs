//! Keybinding handler implementations
//!
//! Handlers translate keys into [`AppAction`]s on the dispatcher; the event
//! loop applies them on its next pass. Only the escape flag is touched
//! directly since it must be settled before the next key arrives.

use std::time::Instant;

use ratatui::crossterm::event::{KeyCode, KeyEvent};

use super::registry::{KeyHandler, KeyResult};
use super::KeyLoopAction;
use crate::core::app::{AppAction, AppActionContext, AppActionDispatcher, ScrollDelta};
use crate::core::constants::MOUSE_SCROLL_LINES;
use crate::ui::chat_loop::AppHandle;

fn context(term_width: u16, term_height: u16) -> AppActionContext {
    AppActionContext {
        term_width,
        term_height,
    }
}

/// Handler for Ctrl+C (quit)
#[derive(Clone)]
pub struct CtrlCHandler;

#[async_trait::async_trait]
impl KeyHandler for CtrlCHandler {
    async fn handle(
        &self,
        _app: &AppHandle,
        _dispatcher: &AppActionDispatcher,
        _key: &KeyEvent,
        _term_width: u16,
        _term_height: u16,
    ) -> KeyResult {
        KeyLoopAction::Break.into()
    }
}

/// Esc in the prompt arms Esc+Enter as a newline.
pub struct EscapeHandler;

#[async_trait::async_trait]
impl KeyHandler for EscapeHandler {
    async fn handle(
        &self,
        app: &AppHandle,
        _dispatcher: &AppActionDispatcher,
        _key: &KeyEvent,
        _term_width: u16,
        _term_height: u16,
    ) -> KeyResult {
        app.update(|app| app.ui.escape_pending = Some(Instant::now()))
            .await;
        KeyResult::Handled
    }
}

/// Enter sends the prompt from either pane, or inserts a newline right after
/// Esc in the prompt.
#[derive(Clone)]
pub struct EnterHandler;

#[async_trait::async_trait]
impl KeyHandler for EnterHandler {
    async fn handle(
        &self,
        app: &AppHandle,
        dispatcher: &AppActionDispatcher,
        _key: &KeyEvent,
        term_width: u16,
        term_height: u16,
    ) -> KeyResult {
        let escaped = app
            .update(|app| app.ui.take_escape_prefix(Instant::now()))
            .await;
        let action = if escaped {
            AppAction::InsertNewline
        } else {
            AppAction::SubmitInput
        };
        dispatcher.dispatch(action, context(term_width, term_height));
        KeyResult::Handled
    }
}

/// Handler for Alt+Enter (newline in the prompt)
pub struct AltEnterHandler;

#[async_trait::async_trait]
impl KeyHandler for AltEnterHandler {
    async fn handle(
        &self,
        _app: &AppHandle,
        dispatcher: &AppActionDispatcher,
        _key: &KeyEvent,
        term_width: u16,
        term_height: u16,
    ) -> KeyResult {
        dispatcher.dispatch(AppAction::InsertNewline, context(term_width, term_height));
        KeyResult::Handled
    }
}

#[derive(Clone)]
pub struct TabHandler;

#[async_trait::async_trait]
impl KeyHandler for TabHandler {
    async fn handle(
        &self,
        _app: &AppHandle,
        dispatcher: &AppActionDispatcher,
        _key: &KeyEvent,
        term_width: u16,
        term_height: u16,
    ) -> KeyResult {
        dispatcher.dispatch(AppAction::ToggleFocus, context(term_width, term_height));
        KeyResult::Handled
    }
}

/// Esc in the response pane returns to the prompt.
pub struct FocusInputHandler;

#[async_trait::async_trait]
impl KeyHandler for FocusInputHandler {
    async fn handle(
        &self,
        _app: &AppHandle,
        dispatcher: &AppActionDispatcher,
        _key: &KeyEvent,
        term_width: u16,
        term_height: u16,
    ) -> KeyResult {
        dispatcher.dispatch(AppAction::FocusInput, context(term_width, term_height));
        KeyResult::Handled
    }
}

/// Moves the response cursor. PageUp/PageDown work from either pane; the
/// arrows, Home and End are bound only while the response pane has focus.
#[derive(Clone)]
pub struct ScrollHandler;

impl ScrollHandler {
    pub fn delta_for(code: KeyCode) -> Option<ScrollDelta> {
        match code {
            KeyCode::Up => Some(ScrollDelta::Up(1)),
            KeyCode::Down => Some(ScrollDelta::Down(1)),
            KeyCode::PageUp => Some(ScrollDelta::PageUp),
            KeyCode::PageDown => Some(ScrollDelta::PageDown),
            KeyCode::Home => Some(ScrollDelta::Start),
            KeyCode::End => Some(ScrollDelta::End),
            _ => None,
        }
    }
}

#[async_trait::async_trait]
impl KeyHandler for ScrollHandler {
    async fn handle(
        &self,
        _app: &AppHandle,
        dispatcher: &AppActionDispatcher,
        key: &KeyEvent,
        term_width: u16,
        term_height: u16,
    ) -> KeyResult {
        let Some(delta) = Self::delta_for(key.code) else {
            return KeyResult::NotHandled;
        };
        dispatcher.dispatch(
            AppAction::ScrollOutput { delta },
            context(term_width, term_height),
        );
        KeyResult::Handled
    }
}

/// Scroll action for one mouse wheel notch.
pub fn wheel_action(up: bool) -> AppAction {
    let delta = if up {
        ScrollDelta::Up(MOUSE_SCROLL_LINES)
    } else {
        ScrollDelta::Down(MOUSE_SCROLL_LINES)
    };
    AppAction::ScrollOutput { delta }
}
