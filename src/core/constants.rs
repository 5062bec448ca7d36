//! Shared constants used across the application

use std::time::Duration;

/// Column width markdown replies are laid out at before they reach the output pane.
pub const RENDER_WIDTH: usize = 100;

/// Width of the `─` rule drawn above and below every reply.
pub const SEPARATOR_WIDTH: usize = 60;

/// Visible rows of the prompt editor. Content beyond this scrolls inside the pane.
pub const INPUT_VISIBLE_HEIGHT: u16 = 5;

/// Syntect theme used for fenced code blocks. Stands in for monokai, which
/// syntect's bundled default themes do not include.
pub const CODE_THEME: &str = "base16-eighties.dark";

/// Model used when `CHAT_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Name prefixed onto every error string the completion client returns.
pub const SERVICE_NAME: &str = "OpenAI";

/// How long a bare Esc keeps Esc+Enter armed as a newline.
pub const ESCAPE_PREFIX_TIMEOUT: Duration = Duration::from_millis(500);

/// Lines moved per mouse wheel notch in the output pane.
pub const MOUSE_SCROLL_LINES: usize = 3;
