//! Focus-aware keybindings
//!
//! Keys are resolved against the focused pane. See [`build_mode_aware_registry`]
//! for the full table.

pub mod handlers;
pub mod registry;

pub use registry::{KeyContext, KeyResult, ModeAwareRegistry};

/// Action to take in the main event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLoopAction {
    Continue,
    Break,
}

/// Build a complete mode-aware registry with all handlers
pub fn build_mode_aware_registry() -> ModeAwareRegistry {
    use handlers::*;
    use ratatui::crossterm::event::KeyCode;
    use registry::{KeyContext, KeyPattern, ModeAwareBuilder};

    ModeAwareBuilder::new()
        .register_everywhere(KeyPattern::ctrl(KeyCode::Char('c')), CtrlCHandler)
        .register_everywhere(KeyPattern::simple(KeyCode::Enter), EnterHandler)
        .register_everywhere(KeyPattern::simple(KeyCode::Tab), TabHandler)
        .register_everywhere(KeyPattern::simple(KeyCode::PageUp), ScrollHandler)
        .register_everywhere(KeyPattern::simple(KeyCode::PageDown), ScrollHandler)
        // Prompt
        .register_for_context(
            KeyContext::Input,
            KeyPattern::alt(KeyCode::Enter),
            Box::new(AltEnterHandler),
        )
        .register_for_context(
            KeyContext::Input,
            KeyPattern::simple(KeyCode::Esc),
            Box::new(EscapeHandler),
        )
        // Response pane
        .register_for_context(
            KeyContext::Output,
            KeyPattern::simple(KeyCode::Up),
            Box::new(ScrollHandler),
        )
        .register_for_context(
            KeyContext::Output,
            KeyPattern::simple(KeyCode::Down),
            Box::new(ScrollHandler),
        )
        .register_for_context(
            KeyContext::Output,
            KeyPattern::simple(KeyCode::Home),
            Box::new(ScrollHandler),
        )
        .register_for_context(
            KeyContext::Output,
            KeyPattern::simple(KeyCode::End),
            Box::new(ScrollHandler),
        )
        .register_for_context(
            KeyContext::Output,
            KeyPattern::simple(KeyCode::Esc),
            Box::new(FocusInputHandler),
        )
        .build()
}
