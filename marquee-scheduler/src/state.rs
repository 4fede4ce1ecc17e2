//! Per-task run bookkeeping

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Where a task stands relative to its interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Not attempted since the daemon started
    NeverRun,
    /// Ran recently; interval not yet elapsed
    Idle,
    /// Interval elapsed
    Due,
}

impl TaskState {
    pub fn should_run(self) -> bool {
        matches!(self, TaskState::NeverRun | TaskState::Due)
    }
}

/// Last attempt time per task id, in memory only
///
/// Nothing survives a restart: every task starts out [`TaskState::NeverRun`].
#[derive(Debug, Default)]
pub struct ScheduleState {
    last_run: HashMap<String, Instant>,
}

impl ScheduleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, source_id: &str, interval: Duration, now: Instant) -> TaskState {
        match self.last_run.get(source_id) {
            None => TaskState::NeverRun,
            Some(last) if now.saturating_duration_since(*last) >= interval => TaskState::Due,
            Some(_) => TaskState::Idle,
        }
    }

    /// Record an attempt, successful or not
    pub fn mark_run(&mut self, source_id: &str, at: Instant) {
        self.last_run.insert(source_id.to_string(), at);
    }

    pub fn last_run(&self, source_id: &str) -> Option<Instant> {
        self.last_run.get(source_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_state_transitions() {
        let mut state = ScheduleState::new();
        let interval = Duration::from_secs(60);
        let start = Instant::now();

        assert_eq!(state.state("a", interval, start), TaskState::NeverRun);
        assert!(TaskState::NeverRun.should_run());

        state.mark_run("a", start);
        assert_eq!(state.state("a", interval, start), TaskState::Idle);
        assert!(!TaskState::Idle.should_run());

        let almost = start + Duration::from_secs(59);
        assert_eq!(state.state("a", interval, almost), TaskState::Idle);

        let exactly = start + interval;
        assert_eq!(state.state("a", interval, exactly), TaskState::Due);
        assert!(TaskState::Due.should_run());

        state.mark_run("a", exactly);
        assert_eq!(state.state("a", interval, exactly), TaskState::Idle);
        assert_eq!(state.last_run("a"), Some(exactly));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shorter_interval_makes_task_due_sooner() {
        let mut state = ScheduleState::new();
        let start = Instant::now();
        state.mark_run("hockey", start);

        let now = start + Duration::from_secs(150);
        assert_eq!(state.state("hockey", Duration::from_secs(7200), now), TaskState::Idle);
        assert_eq!(state.state("hockey", Duration::from_secs(120), now), TaskState::Due);
    }
}
