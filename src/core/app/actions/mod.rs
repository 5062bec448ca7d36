mod input;
mod submit;

use ratatui::crossterm::event::KeyEvent;
use tokio::sync::mpsc;

use super::App;
use crate::core::completion::CompletionParams;

pub enum AppAction {
    SubmitInput,
    CompletionFinished { request_id: u64, reply: String },
    /// A key for the prompt editor, applied in order with other actions.
    EditInput { key: KeyEvent },
    InsertNewline,
    InsertIntoInput { text: String },
    ScrollOutput { delta: ScrollDelta },
    ToggleFocus,
    FocusInput,
}

/// Cursor movement in the output pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDelta {
    Up(usize),
    Down(usize),
    PageUp,
    PageDown,
    Start,
    End,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppActionContext {
    pub term_width: u16,
    pub term_height: u16,
}

pub struct AppActionEnvelope {
    pub action: AppAction,
    pub context: AppActionContext,
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppActionEnvelope>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppActionEnvelope>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction, ctx: AppActionContext) {
        self.dispatch_many([action], ctx);
    }

    pub fn dispatch_many<I>(&self, actions: I, ctx: AppActionContext)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            let _ = self.tx.send(AppActionEnvelope {
                action,
                context: ctx,
            });
        }
    }
}

/// Side effects the loop performs after state has been updated.
pub enum AppCommand {
    RequestCompletion(CompletionParams),
}

pub fn apply_actions(
    app: &mut App,
    envelopes: impl IntoIterator<Item = AppActionEnvelope>,
) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for envelope in envelopes {
        if let Some(cmd) = apply_action(app, envelope.action, envelope.context) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction, ctx: AppActionContext) -> Option<AppCommand> {
    match action {
        AppAction::SubmitInput | AppAction::CompletionFinished { .. } => {
            submit::handle_submit_action(app, action, ctx)
        }

        AppAction::EditInput { .. }
        | AppAction::InsertNewline
        | AppAction::InsertIntoInput { .. }
        | AppAction::ScrollOutput { .. }
        | AppAction::ToggleFocus
        | AppAction::FocusInput => input::handle_input_action(app, action, ctx),
    }
}
