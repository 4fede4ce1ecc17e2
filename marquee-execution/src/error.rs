//! Execution and rendering error types

use marquee_caching::CacheError;
use marquee_plugin::PluginError;
use std::path::PathBuf;
use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

/// Reasons a definition could not be executed or finished
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// Another execution of the same task id is still in progress
    #[error("already running")]
    AlreadyRunning { source_id: String },

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Rendering collaborator failures
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid output id '{0}'")]
    InvalidOutputId(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize artifact: {0}")]
    Serialization(#[from] serde_json::Error),
}
