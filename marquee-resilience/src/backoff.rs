//! Backoff strategies for retry policies

use std::time::Duration;

/// Delay between a failed attempt and the next one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// Explicit delay per failed attempt; the last value repeats and an
    /// empty schedule means no delay at all
    Schedule(Vec<Duration>),
}

impl BackoffStrategy {
    /// Schedule from whole seconds, as written in the sources document
    pub fn from_seconds(seconds: &[u64]) -> Self {
        BackoffStrategy::Schedule(seconds.iter().copied().map(Duration::from_secs).collect())
    }

    /// Delay after failed attempt `attempt` (1-indexed)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Schedule(delays) => {
                let index = (attempt as usize).saturating_sub(1);
                delays
                    .get(index)
                    .or_else(|| delays.last())
                    .copied()
                    .unwrap_or(Duration::ZERO)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        BackoffStrategy::from_seconds(&[1, 2, 4])
    }
}
