//! Daemon scheduling configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigResult;
use crate::validation::{validate_range, validate_required_string, validate_url, Validatable};

/// Daemon loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Seconds between scheduler ticks
    pub tick_seconds: u64,

    /// Base interval applied to every task without a per-task override.
    /// When unset, the interval is derived from each task's cron schedule.
    #[serde(
        with = "crate::domains::utils::serde_duration_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_interval_seconds: Option<Duration>,

    /// Per-task base interval in seconds, keyed by source id
    pub intervals: BTreeMap<String, u64>,

    /// Live-event acceleration
    pub live: LiveConfig,
}

/// Shortened polling while a time-sensitive event is in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub interval_seconds: Duration,

    /// Source types whose tasks are accelerated
    pub source_types: Vec<String>,

    /// Individual source ids that are accelerated
    pub source_ids: Vec<String>,

    pub probe: ProbeConfig,
}

/// How the daemon decides whether a live event is in progress
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProbeConfig {
    #[default]
    None,
    /// GET `url` and read the boolean at JSON pointer `pointer`
    Http {
        url: String,
        #[serde(default = "default_probe_pointer")]
        pointer: String,
        #[serde(
            with = "crate::domains::utils::serde_duration",
            default = "default_probe_timeout"
        )]
        timeout_seconds: Duration,
    },
    /// Live while the file exists
    FlagFile { path: PathBuf },
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 30,
            default_interval_seconds: None,
            intervals: BTreeMap::new(),
            live: LiveConfig::default(),
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            interval_seconds: Duration::from_secs(120),
            source_types: Vec::new(),
            source_ids: Vec::new(),
            probe: ProbeConfig::None,
        }
    }
}

impl DaemonConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_seconds)
    }

    /// Configured base interval for a task, if any
    pub fn interval_for(&self, source_id: &str) -> Option<Duration> {
        self.intervals
            .get(source_id)
            .map(|seconds| Duration::from_secs(*seconds))
            .or(self.default_interval_seconds)
    }
}

impl LiveConfig {
    /// Whether a task may use the live override interval
    pub fn is_eligible(&self, source_id: &str, source_type: &str) -> bool {
        self.source_ids.iter().any(|id| id == source_id)
            || self.source_types.iter().any(|t| t == source_type)
    }

    pub fn has_eligible_sources(&self) -> bool {
        !self.source_ids.is_empty() || !self.source_types.is_empty()
    }
}

impl Validatable for DaemonConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_range(self.tick_seconds, 1, 3600, "tick_seconds", self.domain_name())?;

        if let Some(interval) = self.default_interval_seconds {
            if interval.is_zero() {
                return Err(self.validation_error("default_interval_seconds must be positive"));
            }
        }

        for (source_id, seconds) in &self.intervals {
            if *seconds == 0 {
                return Err(self.validation_error(format!(
                    "interval for '{}' must be positive",
                    source_id
                )));
            }
        }

        self.live.validate()
    }

    fn domain_name(&self) -> &'static str {
        "daemon"
    }
}

impl Validatable for LiveConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.interval_seconds.is_zero() {
            return Err(self.validation_error("interval_seconds must be positive"));
        }

        match &self.probe {
            ProbeConfig::None => Ok(()),
            ProbeConfig::Http {
                url,
                pointer,
                timeout_seconds,
            } => {
                validate_url(url, "probe.url", self.domain_name())?;
                if !pointer.is_empty() && !pointer.starts_with('/') {
                    return Err(self.validation_error(format!(
                        "probe.pointer must be a JSON pointer starting with '/', got '{}'",
                        pointer
                    )));
                }
                if timeout_seconds.is_zero() {
                    return Err(self.validation_error("probe.timeout_seconds must be positive"));
                }
                Ok(())
            }
            ProbeConfig::FlagFile { path } => validate_required_string(
                &path.to_string_lossy(),
                "probe.path",
                self.domain_name(),
            ),
        }
    }

    fn domain_name(&self) -> &'static str {
        "daemon.live"
    }
}

fn default_probe_pointer() -> String {
    "/live".to_string()
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(10)
}
