//! Neon Chat is a full-screen terminal client for OpenAI-compatible chat APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns configuration, the transcript, the completion client and
//!   the action-driven app state.
//! - [`ui`] renders markdown replies to ANSI text, draws the two-pane
//!   interface and runs the interactive event loop.
//! - [`api`] defines the chat completion request and response payloads.
//! - [`utils`] holds the file logger.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which reads the environment and hands off to
//! [`ui::chat_loop::run_chat`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
