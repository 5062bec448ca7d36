//! Diagnostics log.
//!
//! The UI owns the terminal, so tracing output can only go to a file. Nothing
//! is installed unless a path is configured.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "neon_chat=info";

#[derive(Debug)]
pub enum LogInitError {
    Open { path: String, source: io::Error },
    Subscriber(String),
}

impl fmt::Display for LogInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogInitError::Open { path, source } => {
                write!(f, "cannot open log file {path}: {source}")
            }
            LogInitError::Subscriber(message) => {
                write!(f, "cannot install log subscriber: {message}")
            }
        }
    }
}

impl std::error::Error for LogInitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogInitError::Open { source, .. } => Some(source),
            LogInitError::Subscriber(_) => None,
        }
    }
}

/// Opens (creating if needed) the log file in append mode and checks it is
/// writable.
pub fn open_log_file(path: &str) -> Result<File, LogInitError> {
    let open = || -> io::Result<File> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(Path::new(path))?;
        file.flush()?;
        Ok(file)
    };
    open().map_err(|source| LogInitError::Open {
        path: path.to_string(),
        source,
    })
}

/// `RUST_LOG` when set and valid, otherwise [`DEFAULT_FILTER`].
pub fn build_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Routes `tracing` events to `log_file`. With `None` this is a no-op and
/// events are discarded.
pub fn init_tracing(log_file: Option<&str>) -> Result<(), LogInitError> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = open_log_file(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| LogInitError::Subscriber(err.to_string()))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging started");
    Ok(())
}
