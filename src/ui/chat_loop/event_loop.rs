//! Event polling, dispatching, and UI rendering loop.
//!
//! Each pass draws a frame when one is due, routes pending terminal events,
//! turns finished completions into actions and applies every queued action.
//! Completions run as Tokio tasks so several sends can be in flight while
//! the UI keeps drawing.

use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseEventKind};
use ratatui::prelude::Size;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::app::{
    apply_actions, App, AppAction, AppActionContext, AppActionDispatcher, AppActionEnvelope,
    AppCommand,
};
use crate::core::completion::{CompletionOutcome, CompletionService};
use crate::core::config::Config;
use crate::ui::renderer::ui;

use super::keybindings::handlers::wheel_action;
use super::keybindings::{build_mode_aware_registry, KeyContext, KeyResult, ModeAwareRegistry};
use super::lifecycle::{restore_terminal, setup_terminal, SharedTerminal};
use super::AppHandle;

const MAX_FPS: u64 = 60;
const IDLE_SLEEP: Duration = Duration::from_millis(16);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

async fn current_terminal_size(terminal: &SharedTerminal) -> Size {
    let terminal_guard = terminal.lock().await;
    terminal_guard.size().unwrap_or_default()
}

/// Frame pacing: a draw happens only when something changed and at most
/// `MAX_FPS` times a second.
struct FrameClock {
    frame_duration: Duration,
    last_draw: Instant,
    dirty: bool,
}

impl FrameClock {
    fn new(max_fps: u64) -> Self {
        let frame_duration = Duration::from_millis(1000 / max_fps.max(1));
        Self {
            frame_duration,
            last_draw: Instant::now()
                .checked_sub(frame_duration)
                .unwrap_or_else(Instant::now),
            dirty: true,
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn frame_due(&self, now: Instant) -> bool {
        self.dirty && now.duration_since(self.last_draw) >= self.frame_duration
    }

    fn drawn(&mut self, now: Instant) {
        self.last_draw = now;
        self.dirty = false;
    }
}

async fn try_draw_frame(
    app: &AppHandle,
    terminal: &SharedTerminal,
    clock: &mut FrameClock,
) -> io::Result<()> {
    let now = Instant::now();
    if !clock.frame_due(now) {
        return Ok(());
    }

    let mut terminal_guard = terminal.lock().await;
    app.update(|app| terminal_guard.draw(|f| ui(f, app)))
        .await?;
    clock.drawn(now);
    Ok(())
}

async fn disarm_escape(app: &AppHandle) {
    app.update(|app| app.ui.escape_pending = None).await;
}

struct EventProcessingOutcome {
    events_processed: bool,
    request_redraw: bool,
    exit_requested: bool,
}

async fn process_ui_events(
    app: &AppHandle,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    mode_registry: &ModeAwareRegistry,
    dispatcher: &AppActionDispatcher,
    term_size: Size,
) -> EventProcessingOutcome {
    let mut outcome = EventProcessingOutcome {
        events_processed: false,
        request_redraw: false,
        exit_requested: false,
    };
    let ctx = AppActionContext {
        term_width: term_size.width,
        term_height: term_size.height,
    };

    while let Ok(ev) = event_rx.try_recv() {
        outcome.events_processed = true;
        match ev {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                let keyboard_outcome =
                    route_keyboard_event(app, mode_registry, dispatcher, key, term_size).await;
                if keyboard_outcome.exit_requested {
                    outcome.exit_requested = true;
                    outcome.request_redraw = true;
                    break;
                }
                if keyboard_outcome.request_redraw {
                    outcome.request_redraw = true;
                }
            }
            UiEvent::Crossterm(Event::Paste(text)) => {
                disarm_escape(app).await;
                handle_paste_event(dispatcher, ctx, text);
                outcome.request_redraw = true;
            }
            UiEvent::Crossterm(Event::Mouse(mouse)) => {
                disarm_escape(app).await;
                match mouse.kind {
                    MouseEventKind::ScrollUp => dispatcher.dispatch(wheel_action(true), ctx),
                    MouseEventKind::ScrollDown => dispatcher.dispatch(wheel_action(false), ctx),
                    _ => {}
                }
            }
            UiEvent::Crossterm(Event::Resize(_, _)) => {
                outcome.request_redraw = true;
            }
            UiEvent::Crossterm(_) => {}
        }
    }

    if outcome.events_processed {
        outcome.request_redraw = true;
    }

    outcome
}

struct KeyboardEventOutcome {
    request_redraw: bool,
    exit_requested: bool,
}

async fn route_keyboard_event(
    app: &AppHandle,
    mode_registry: &ModeAwareRegistry,
    dispatcher: &AppActionDispatcher,
    key: event::KeyEvent,
    term_size: Size,
) -> KeyboardEventOutcome {
    // Esc+Enter is a newline only when the two keys are adjacent.
    let keeps_escape = matches!(key.code, KeyCode::Enter | KeyCode::Esc);
    let context = app
        .update(|app| {
            if !keeps_escape {
                app.ui.escape_pending = None;
            }
            KeyContext::from(app.ui.focus)
        })
        .await;

    if mode_registry.should_handle_as_text_input(&key, context) {
        dispatcher.dispatch(
            AppAction::EditInput { key },
            AppActionContext {
                term_width: term_size.width,
                term_height: term_size.height,
            },
        );
        return KeyboardEventOutcome {
            request_redraw: true,
            exit_requested: false,
        };
    }

    let result = mode_registry
        .handle_key_event(
            app,
            dispatcher,
            &key,
            context,
            term_size.width,
            term_size.height,
        )
        .await;

    match result {
        KeyResult::Exit => KeyboardEventOutcome {
            request_redraw: true,
            exit_requested: true,
        },
        KeyResult::Continue | KeyResult::Handled => KeyboardEventOutcome {
            request_redraw: true,
            exit_requested: false,
        },
        KeyResult::NotHandled => KeyboardEventOutcome {
            request_redraw: false,
            exit_requested: false,
        },
    }
}

pub(crate) fn sanitize_pasted_text(text: &str) -> String {
    let without_crlf = text.replace("\r\n", "\n");
    let without_cr = without_crlf.replace('\r', "\n");
    let expanded_tabs = without_cr.replace('\t', "    ");
    expanded_tabs
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

pub(crate) fn handle_paste_event(
    dispatcher: &AppActionDispatcher,
    ctx: AppActionContext,
    text: String,
) {
    let sanitized_text = sanitize_pasted_text(&text);
    if sanitized_text.is_empty() {
        return;
    }

    dispatcher.dispatch(
        AppAction::InsertIntoInput {
            text: sanitized_text,
        },
        ctx,
    );
}

/// Turns finished completions into actions. Returns whether any arrived.
fn process_completion_updates(
    dispatcher: &AppActionDispatcher,
    rx: &mut mpsc::UnboundedReceiver<CompletionOutcome>,
    term_width: u16,
    term_height: u16,
) -> bool {
    let mut actions = Vec::new();
    while let Ok(CompletionOutcome { request_id, reply }) = rx.try_recv() {
        actions.push(AppAction::CompletionFinished { request_id, reply });
    }

    if actions.is_empty() {
        return false;
    }

    dispatcher.dispatch_many(
        actions,
        AppActionContext {
            term_width,
            term_height,
        },
    );
    true
}

async fn drain_action_queue(
    app: &AppHandle,
    completion_service: &CompletionService,
    action_rx: &mut mpsc::UnboundedReceiver<AppActionEnvelope>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(envelope) = action_rx.try_recv() {
        pending.push(envelope);
    }

    if pending.is_empty() {
        return false;
    }

    let commands = app.update(|app| apply_actions(app, pending)).await;
    for cmd in commands {
        match cmd {
            AppCommand::RequestCompletion(params) => {
                debug!(request_id = params.request_id, "spawning completion");
                completion_service.spawn_completion(params);
            }
        }
    }
    true
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Runs the full-screen session until Ctrl+C.
pub async fn run_chat(config: Config) -> Result<(), Box<dyn Error>> {
    let app = AppHandle::new(App::from_config(&config));
    info!(model = %config.model, base_url = %config.base_url, "starting chat session");

    let terminal = setup_terminal()?;

    let (completion_service, mut completion_rx) = CompletionService::new();
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppActionEnvelope>();
    let action_dispatcher = AppActionDispatcher::new(action_tx);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let mode_registry = build_mode_aware_registry();

    let mut clock = FrameClock::new(MAX_FPS);

    let result = 'main_loop: loop {
        if let Err(err) = try_draw_frame(&app, &terminal, &mut clock).await {
            break 'main_loop Err(err.into());
        }

        let term_size = current_terminal_size(&terminal).await;

        let events = process_ui_events(
            &app,
            &mut event_rx,
            &mode_registry,
            &action_dispatcher,
            term_size,
        )
        .await;
        if events.exit_requested {
            break 'main_loop Ok(());
        }

        let replies_arrived = process_completion_updates(
            &action_dispatcher,
            &mut completion_rx,
            term_size.width,
            term_size.height,
        );
        let actions_applied =
            drain_action_queue(&app, &completion_service, &mut action_rx).await;

        if events.request_redraw || replies_arrived || actions_applied {
            clock.mark_dirty();
        }

        if !events.events_processed && !replies_arrived && !clock.is_dirty() {
            tokio::time::sleep(IDLE_SLEEP).await;
        }
    };

    event_reader_handle.abort();
    restore_terminal(&terminal).await?;

    let pending = app.read(|app| app.session.pending_requests()).await;
    info!(pending, "chat session ended");

    result
}

#[cfg(test)]
#[path = "event_loop_tests.rs"]
mod tests;
