//! Scheduler and probe error types

use thiserror::Error;

pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors that prevent the daemon from starting
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// A base interval could not be derived for a task
    #[error("Cannot determine interval for source '{source_id}': {reason}")]
    Interval { source_id: String, reason: String },

    #[error("Failed to build live-event probe: {0}")]
    Probe(#[from] ProbeError),
}

/// Live-event probe failures; the daemon treats them as "not live"
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Live status endpoint returned {0}")]
    Status(u16),

    #[error("No value at JSON pointer '{0}'")]
    MissingPointer(String),

    #[error("Value at JSON pointer '{0}' is not a boolean")]
    NotBoolean(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
