//! Command-line entry point
//!
//! There are no functional flags: everything is configured through the
//! environment, and clap provides `--help` and `--version`.

use std::error::Error;

use clap::Parser;

use crate::core::config::Config;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "neon-chat", version)]
#[command(about = "A neon-styled terminal chat client for OpenAI-compatible APIs")]
#[command(
    long_about = "Neon Chat is a full-screen terminal chat interface. Each prompt is sent \
with the whole conversation so far and the reply is rendered as markdown, with \
syntax-highlighted code blocks, in the response pane.\n\n\
Environment Variables:\n\
  OPENAI_API_KEY    Your API key (errors are shown inline when missing)\n\
  OPENAI_BASE_URL   Custom API base URL (optional, defaults to https://api.openai.com/v1)\n\
  CHAT_MODEL        Model name (optional, defaults to gpt-4o-mini)\n\
  NEON_CHAT_LOG     Write diagnostics to this file (optional, filtered by RUST_LOG)\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a new line (Esc then Enter also works)\n\
  Tab               Switch focus between the prompt and the response pane\n\
  PageUp/PageDown   Scroll the response pane\n\
  Up/Down/Home/End  Scroll the response pane while it has focus\n\
  Mouse wheel       Scroll the response pane\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {}

pub fn main() -> Result<(), Box<dyn Error>> {
    let _args = Args::parse();
    let config = Config::from_env();

    // Logging is optional; a bad path should not keep the chat from starting.
    if let Err(err) = init_tracing(config.log_file.as_deref()) {
        eprintln!("⚠️  {err}");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_chat(config))
}
