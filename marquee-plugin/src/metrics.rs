//! Per-execution metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Measurements for a single execution attempt
///
/// Built fresh for every call and never persisted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    pub task_id: String,
    pub task_type: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub success: bool,
    pub error: Option<String>,
    pub duration_seconds: f64,
    pub data_points: usize,
}

impl ExecutionMetrics {
    /// Metrics for a finished attempt
    ///
    /// `completed_at` is derived from `started_at` plus the monotonic
    /// `elapsed`, so it can never precede `started_at`.
    pub fn finished(
        task_id: impl Into<String>,
        task_type: impl Into<String>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        let completed_at = started_at
            + chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            task_id: task_id.into(),
            task_type: task_type.into(),
            started_at,
            completed_at,
            success: false,
            error: None,
            duration_seconds: elapsed.as_secs_f64(),
            data_points: 0,
        }
    }

    /// Metrics for a task that never got as far as running, for example
    /// because its type is not registered
    pub fn failed_before_start(
        task_id: impl Into<String>,
        task_type: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let mut metrics = Self::finished(task_id, task_type, Utc::now(), Duration::ZERO);
        metrics.error = Some(error.into());
        metrics
    }

    pub(crate) fn succeeded(mut self, data_points: usize) -> Self {
        self.success = true;
        self.data_points = data_points;
        self
    }

    pub(crate) fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }

    /// Short status marker for log lines
    pub fn status(&self) -> &'static str {
        match (self.success, self.error.is_some()) {
            (true, _) => "success",
            (false, true) => "failed",
            (false, false) => "empty",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_never_precedes_started() {
        let started = Utc::now();
        let metrics = ExecutionMetrics::finished("a", "clock", started, Duration::from_millis(1500));
        assert!(metrics.completed_at >= metrics.started_at);
        assert_eq!(metrics.duration_seconds, 1.5);
        assert_eq!(
            (metrics.completed_at - metrics.started_at).num_milliseconds(),
            1500
        );
    }

    #[test]
    fn test_status_markers() {
        let base = ExecutionMetrics::finished("a", "clock", Utc::now(), Duration::ZERO);
        assert_eq!(base.status(), "empty");
        assert_eq!(base.clone().succeeded(3).status(), "success");
        assert_eq!(base.failed("boom").status(), "failed");
    }

    #[test]
    fn test_failed_before_start() {
        let metrics = ExecutionMetrics::failed_before_start("a", "weather", "unknown type");
        assert!(!metrics.success);
        assert_eq!(metrics.error.as_deref(), Some("unknown type"));
        assert_eq!(metrics.duration_seconds, 0.0);
        assert_eq!(metrics.completed_at, metrics.started_at);
    }
}
