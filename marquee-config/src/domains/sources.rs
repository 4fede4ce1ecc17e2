//! Source definitions: one configured task instance each

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domains::utils::default_true;
use crate::error::{ConfigError, ConfigResult};
use crate::validation::{is_valid_source_id, parse_schedule};

/// Opaque per-source configuration, parsed by each source type on its own
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

/// A single entry of the `sources` list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier, `[A-Za-z0-9_-]+`
    pub id: String,

    /// Registry key of the source type (existence checked at execution time)
    #[serde(rename = "type")]
    pub source_type: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Five-field cron expression
    pub schedule: String,

    /// Per-execution timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub config: ConfigMap,

    #[serde(default)]
    pub rendering: RenderingConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub fallback: FallbackConfig,
}

/// Rendering overrides applied on top of what a source produces
///
/// Unset fields leave the source's own defaults untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<RenderMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_query: Option<String>,
}

/// Rendering engine selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Pil,
    Html,
}

/// Where the artifact background comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    Local,
    Unsplash,
    Pexels,
    #[default]
    Gradient,
}

/// Retry policy for failed fetches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Total attempts including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the n-th failed attempt; the last value repeats
    #[serde(default = "default_backoff_seconds")]
    pub backoff_seconds: Vec<u64>,
}

/// Cached-result fallback policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default)]
    pub use_cached: bool,

    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: default_max_attempts(),
            backoff_seconds: default_backoff_seconds(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            use_cached: false,
            max_age_hours: default_max_age_hours(),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Pil => write!(f, "pil"),
            RenderMode::Html => write!(f, "html"),
        }
    }
}

impl fmt::Display for BackgroundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackgroundMode::Local => write!(f, "local"),
            BackgroundMode::Unsplash => write!(f, "unsplash"),
            BackgroundMode::Pexels => write!(f, "pexels"),
            BackgroundMode::Gradient => write!(f, "gradient"),
        }
    }
}

pub const MIN_TIMEOUT_SECONDS: u64 = 1;
pub const MAX_TIMEOUT_SECONDS: u64 = 300;
pub const MIN_RETRY_ATTEMPTS: u32 = 1;
pub const MAX_RETRY_ATTEMPTS: u32 = 10;
pub const MIN_FALLBACK_AGE_HOURS: u64 = 1;
pub const MAX_FALLBACK_AGE_HOURS: u64 = 168;

impl SourceDefinition {
    /// Validate the structure of this definition
    ///
    /// Does not check that `source_type` is registered; that happens when the
    /// executor asks the registry for an instance.
    pub fn validate(&self) -> ConfigResult<()> {
        if !is_valid_source_id(&self.id) {
            return Err(self.field_error(
                "id",
                "must contain only letters, numbers, underscores, and hyphens",
            ));
        }

        if self.source_type.trim().is_empty() {
            return Err(self.field_error("type", "cannot be empty"));
        }

        parse_schedule(&self.schedule).map_err(|reason| ConfigError::InvalidCron {
            source_id: self.id.clone(),
            expression: self.schedule.clone(),
            reason,
        })?;

        if !(MIN_TIMEOUT_SECONDS..=MAX_TIMEOUT_SECONDS).contains(&self.timeout) {
            return Err(self.field_error(
                "timeout",
                format!(
                    "must be between {} and {} seconds, got {}",
                    MIN_TIMEOUT_SECONDS, MAX_TIMEOUT_SECONDS, self.timeout
                ),
            ));
        }

        if !(MIN_RETRY_ATTEMPTS..=MAX_RETRY_ATTEMPTS).contains(&self.retry.max_attempts) {
            return Err(self.field_error(
                "retry.max_attempts",
                format!(
                    "must be between {} and {}, got {}",
                    MIN_RETRY_ATTEMPTS, MAX_RETRY_ATTEMPTS, self.retry.max_attempts
                ),
            ));
        }

        if !(MIN_FALLBACK_AGE_HOURS..=MAX_FALLBACK_AGE_HOURS).contains(&self.fallback.max_age_hours)
        {
            return Err(self.field_error(
                "fallback.max_age_hours",
                format!(
                    "must be between {} and {}, got {}",
                    MIN_FALLBACK_AGE_HOURS, MAX_FALLBACK_AGE_HOURS, self.fallback.max_age_hours
                ),
            ));
        }

        if let Some(layout) = &self.rendering.layout {
            if layout.trim().is_empty() {
                return Err(self.field_error("rendering.layout", "cannot be empty when set"));
            }
        }

        Ok(())
    }

    fn field_error(&self, field: &str, message: impl Into<String>) -> ConfigError {
        ConfigError::invalid_source(self.id.clone(), field, message)
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_seconds() -> Vec<u64> {
    vec![1, 2, 4]
}

fn default_max_age_hours() -> u64 {
    24
}
