use std::fmt;
use std::time::Instant;

use crate::core::constants::ESCAPE_PREFIX_TIMEOUT;
use crate::ui::theme::Theme;
use crate::ui::viewport::{InputViewport, OutputViewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusLabel {
    #[default]
    Ready,
    Thinking,
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLabel::Ready => write!(f, "Ready"),
            StatusLabel::Thinking => write!(f, "Thinking…"),
        }
    }
}

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiFocus {
    #[default]
    Input,
    Output,
}

pub struct UiState {
    pub theme: Theme,
    pub output: OutputViewport,
    pub input: InputViewport,
    pub status: StatusLabel,
    pub focus: UiFocus,
    /// When a bare Esc was pressed; a prompt Enter shortly after inserts a
    /// newline instead of sending.
    pub escape_pending: Option<Instant>,
    /// Text rows of the output pane at the last draw; drives page scrolling.
    pub output_page_rows: u16,
}

impl UiState {
    pub fn new(theme: Theme) -> Self {
        let input = InputViewport::new(&theme);
        Self {
            theme,
            output: OutputViewport::new(),
            input,
            status: StatusLabel::Ready,
            focus: UiFocus::Input,
            escape_pending: None,
            output_page_rows: 0,
        }
    }

    pub fn focus_input(&mut self) {
        self.focus = UiFocus::Input;
    }

    pub fn focus_output(&mut self) {
        self.focus = UiFocus::Output;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            UiFocus::Input => UiFocus::Output,
            UiFocus::Output => UiFocus::Input,
        };
    }

    /// Consumes the Esc prefix. True only if it is still within
    /// [`ESCAPE_PREFIX_TIMEOUT`] at `now`.
    pub fn take_escape_prefix(&mut self, now: Instant) -> bool {
        self.escape_pending
            .take()
            .is_some_and(|pressed| now.saturating_duration_since(pressed) <= ESCAPE_PREFIX_TIMEOUT)
    }

    pub fn is_input_focused(&self) -> bool {
        self.focus == UiFocus::Input
    }

    /// Rows moved by PageUp/PageDown, keeping one line of overlap.
    pub fn output_page_size(&self, term_height: u16) -> usize {
        let rows = if self.output_page_rows > 0 {
            self.output_page_rows
        } else {
            // title, status, input and borders take roughly this much
            term_height.saturating_sub(12)
        };
        usize::from(rows.saturating_sub(1)).max(1)
    }
}
