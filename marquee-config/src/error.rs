//! Configuration error types

use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
///
/// Every variant is fatal at load time: the process must not start scheduling
/// with a document that produced one of these.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading configuration file
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A single field of a source definition is invalid
    #[error("Source '{source_id}' has invalid {field}: {message}")]
    InvalidSource {
        source_id: String,
        field: String,
        message: String,
    },

    /// Schedule is not a valid five-field cron expression
    #[error("Invalid cron expression '{expression}' for source '{source_id}': {reason}")]
    InvalidCron {
        source_id: String,
        expression: String,
        reason: String,
    },

    /// Two or more definitions share an id
    #[error("Duplicate source IDs found: {{{}}}", .ids.join(", "))]
    DuplicateIds { ids: Vec<String> },

    /// A `${NAME}` reference could not be resolved
    #[error("Environment variable {name} not set (referenced by source '{source_id}')")]
    MissingEnvVar { name: String, source_id: String },

    /// Domain-specific configuration error
    #[error("Domain configuration error in {domain}: {message}")]
    DomainError { domain: String, message: String },
}

impl ConfigError {
    /// Create an error for one field of a source definition
    pub fn invalid_source(
        source_id: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidSource {
            source_id: source_id.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}
