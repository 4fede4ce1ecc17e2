//! Registry and source error types

use thiserror::Error;

/// Registry result type
pub type PluginResult<T> = Result<T, PluginError>;

/// Source result type
pub type SourceResult<T> = Result<T, SourceError>;

/// Registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// A constructor is already registered under this type key
    #[error("Source type '{source_type}' is already registered")]
    DuplicateType { source_type: String },

    /// No constructor for this type key
    #[error("Unknown source type '{source_type}' (known types: {})", .known.join(", "))]
    UnknownType {
        source_type: String,
        known: Vec<String>,
    },
}

/// Errors raised by a source while validating its config or fetching data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The opaque config map is unusable for this source type
    #[error("Invalid config ({}): {message}", .fields.join(", "))]
    Validation {
        fields: Vec<String>,
        message: String,
    },

    /// Fetching or parsing the upstream data failed
    #[error("{0}")]
    Fetch(String),

    /// The execution deadline elapsed
    #[error("timeout")]
    Timeout,

    /// The source panicked
    #[error("source panicked: {0}")]
    Panicked(String),
}

impl SourceError {
    /// Validation error naming a single field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            fields: vec![field.into()],
            message: message.into(),
        }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// Whether another attempt could succeed
    ///
    /// A misconfigured source fails the same way every time.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SourceError::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PluginError::UnknownType {
            source_type: "weather".to_string(),
            known: vec!["clock".to_string(), "static_text".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown source type 'weather' (known types: clock, static_text)"
        );

        assert_eq!(SourceError::Timeout.to_string(), "timeout");
        assert_eq!(SourceError::fetch("HTTP 503").to_string(), "HTTP 503");
        assert_eq!(
            SourceError::invalid_field("lines", "must be a list").to_string(),
            "Invalid config (lines): must be a list"
        );
    }

    #[test]
    fn test_retryability() {
        assert!(SourceError::Timeout.is_retryable());
        assert!(SourceError::fetch("boom").is_retryable());
        assert!(SourceError::Panicked("boom".to_string()).is_retryable());
        assert!(!SourceError::invalid_field("url", "missing").is_retryable());
    }
}
