//! Error types for the monitor pipeline
//!
//! Only resource and configuration failures surface as errors. A malformed
//! log line is skipped by the ingestion loop and never becomes a `MonitorError`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal conditions that stop the pipeline or prevent it from starting
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MonitorError {
    /// File watcher could not be created or the path could not be watched
    #[error("failed to watch log file {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// The watcher reported an error while the tailer was waiting
    #[error("file watcher error on {}: {source}", path.display())]
    WatchEvent {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// Log file could not be opened
    #[error("failed to open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unrecoverable read error while tailing
    #[error("failed to read log file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tailer was opened twice
    #[error("log tailer for {} was already opened", path.display())]
    AlreadyOpened { path: PathBuf },

    /// Averaging window is shorter than its quantum or spans too many quanta
    #[error(
        "alert window {window:?} must span between 1 and {} quanta of {quantum:?}",
        crate::constants::rate::MAX_WINDOW_SLOTS
    )]
    InvalidWindow { window: Duration, quantum: Duration },

    /// Any other invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MonitorError {
    /// Whether the error happened before the pipeline reached steady state
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::InvalidWindow { .. } | Self::Config(_))
    }
}
