pub mod app;
pub mod completion;
pub mod config;
pub mod constants;
pub mod message;
