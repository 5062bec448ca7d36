//! Send orchestration.
//!
//! A submit trims the input, echoes it to the output pane, records the user
//! turn and hands back a completion command. The reply comes back later as
//! [`AppAction::CompletionFinished`], possibly interleaved with other submits;
//! replies are appended in the order they arrive.

use tracing::{debug, info};

use super::{App, AppAction, AppActionContext, AppCommand};
use crate::core::app::ui_state::StatusLabel;
use crate::core::completion::CompletionParams;
use crate::core::constants::SEPARATOR_WIDTH;
use crate::core::message::Role;
use crate::ui::ansi::paint;
use crate::ui::markdown::render_markdown;
use crate::ui::theme::Theme;

pub(super) fn handle_submit_action(
    app: &mut App,
    action: AppAction,
    _ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::SubmitInput => submit_input(app),
        AppAction::CompletionFinished { request_id, reply } => {
            finish_completion(app, request_id, reply);
            None
        }
        _ => None,
    }
}

fn submit_input(app: &mut App) -> Option<AppCommand> {
    let raw = app.ui.input.text();
    let prompt = raw.trim();
    if prompt.is_empty() {
        return None;
    }
    let prompt = prompt.to_string();

    app.ui.input.clear();
    app.ui.output.append(&user_echo(&app.ui.theme, &prompt));
    app.transcript.append(Role::User, prompt.as_str());

    let request_id = app.session.begin_request();
    app.ui.status = StatusLabel::Thinking;
    info!(
        request_id,
        chars = prompt.chars().count(),
        history = app.transcript.len(),
        "prompt submitted"
    );

    Some(AppCommand::RequestCompletion(CompletionParams {
        backend: app.session.backend.clone(),
        model: app.session.model.clone(),
        messages: app.transcript.as_request_payload(),
        request_id,
    }))
}

fn finish_completion(app: &mut App, request_id: u64, reply: String) {
    if !app.session.finish_request(request_id) {
        debug!(request_id, "ignoring reply for unknown request");
        return;
    }

    let rendered = render_markdown(&reply);
    app.transcript.append(Role::Assistant, reply);
    app.ui
        .output
        .append(&response_block(&app.ui.theme, &rendered));

    if !app.session.has_pending_requests() {
        app.ui.status = StatusLabel::Ready;
    }
    app.ui.focus_input();
    debug!(
        request_id,
        pending = app.session.pending_requests(),
        "reply rendered"
    );
}

pub(crate) fn user_echo(theme: &Theme, prompt: &str) -> String {
    format!("\n{} {prompt}\n", paint(theme.user_prefix_style, "➤ [You]:"))
}

pub(crate) fn response_block(theme: &Theme, rendered: &str) -> String {
    let separator = paint(theme.separator_style, &"─".repeat(SEPARATOR_WIDTH));
    let mut block = String::with_capacity(rendered.len() + separator.len() * 2 + 3);
    block.push_str(&separator);
    block.push('\n');
    block.push_str(rendered);
    if !rendered.is_empty() && !rendered.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(&separator);
    block.push('\n');
    block
}
