//! Terminal UI layer for interactive chat sessions.
//!
//! The UI module owns rendering, layout, keyboard handling, and loop control
//! for the text user interface.
//!
//! Key submodules include:
//! - [`chat_loop`]: the main interaction loop that turns terminal events into
//!   app actions and runs completions in the background.
//! - [`markdown`] and [`ansi`]: reply rendering to ANSI text and lexing it
//!   back into styled spans for display.
//! - [`renderer`], [`viewport`] and [`wrap`]: pane buffers and frame output.
//! - [`theme`]: the neon palette.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns domain logic and backend coordination.

pub mod ansi;
pub mod chat_loop;
pub mod markdown;
pub mod renderer;
pub mod theme;
pub mod viewport;
pub mod wrap;
