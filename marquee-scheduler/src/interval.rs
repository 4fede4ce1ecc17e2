//! Base interval per task, and the live override
//!
//! A task without a configured interval runs at the shortest gap between its
//! cron firings, around the clock. Hour, day and weekday windows in the
//! expression are not honoured, so `*/5 9-17 * * *` runs every five minutes
//! overnight as well. Windowed schedules should set `daemon.intervals` or
//! `daemon.default_interval_seconds`.

use chrono::Utc;
use marquee_config::{parse_schedule, MarqueeConfig, SourceDefinition};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{SchedulerError, SchedulerResult};

/// Upcoming cron occurrences inspected when deriving an interval
const CRON_SAMPLE: usize = 16;

/// Used when a schedule fires fewer than twice in the sample window
const FALLBACK_INTERVAL: Duration = Duration::from_secs(3600);

/// Resolves the interval a task should run at
#[derive(Debug, Clone)]
pub struct IntervalResolver {
    base: HashMap<String, Duration>,
    live: Duration,
}

impl IntervalResolver {
    /// Resolve base intervals for every enabled definition
    ///
    /// Order: `daemon.intervals[id]`, then `daemon.default_interval_seconds`,
    /// then the shortest gap between upcoming firings of the cron schedule.
    pub fn from_config(config: &MarqueeConfig) -> SchedulerResult<Self> {
        let mut base = HashMap::new();
        for source in config.enabled_sources() {
            let interval = match config.daemon.interval_for(&source.id) {
                Some(interval) => interval,
                None => interval_from_schedule(source)?,
            };
            tracing::debug!(
                source_id = %source.id,
                interval_seconds = interval.as_secs(),
                "Resolved base interval"
            );
            base.insert(source.id.clone(), interval);
        }

        Ok(Self {
            base,
            live: config.daemon.live.interval_seconds,
        })
    }

    pub fn base(&self, source_id: &str) -> Option<Duration> {
        self.base.get(source_id).copied()
    }

    /// Interval for this decision; `live` substitutes the live override
    pub fn resolve(&self, source_id: &str, live: bool) -> Duration {
        if live {
            return self.live;
        }
        self.base(source_id).unwrap_or(FALLBACK_INTERVAL)
    }
}

/// Shortest gap between consecutive upcoming firings of the cron schedule
///
/// Only the spacing between firings is kept, not their position in the day,
/// so any hour or day window in the expression has no effect.
pub fn interval_from_schedule(source: &SourceDefinition) -> SchedulerResult<Duration> {
    let schedule = parse_schedule(&source.schedule).map_err(|reason| SchedulerError::Interval {
        source_id: source.id.clone(),
        reason,
    })?;

    let upcoming: Vec<_> = schedule.upcoming(Utc).take(CRON_SAMPLE).collect();
    let shortest = upcoming
        .windows(2)
        .filter_map(|pair| (pair[1] - pair[0]).to_std().ok())
        .min();

    Ok(shortest.unwrap_or(FALLBACK_INTERVAL))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> MarqueeConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_interval_derived_from_cron() {
        let config = config(
            r#"
sources:
  - { id: every_15, type: clock, schedule: "*/15 * * * *" }
  - { id: hourly, type: clock, schedule: "0 * * * *" }
  - { id: minutely, type: clock, schedule: "* * * * *" }
"#,
        );

        let resolver = IntervalResolver::from_config(&config).unwrap();
        assert_eq!(resolver.base("every_15"), Some(Duration::from_secs(900)));
        assert_eq!(resolver.base("hourly"), Some(Duration::from_secs(3600)));
        assert_eq!(resolver.base("minutely"), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_configured_intervals_take_precedence() {
        let config = config(
            r#"
sources:
  - { id: weather, type: weather, schedule: "*/15 * * * *" }
  - { id: stock, type: stock, schedule: "*/15 * * * *" }
  - { id: off, type: stock, schedule: "*/15 * * * *", enabled: false }
daemon:
  default_interval_seconds: 1800
  intervals:
    stock: 300
  live:
    interval_seconds: 90
"#,
        );

        let resolver = IntervalResolver::from_config(&config).unwrap();
        assert_eq!(resolver.resolve("weather", false), Duration::from_secs(1800));
        assert_eq!(resolver.resolve("stock", false), Duration::from_secs(300));
        assert_eq!(resolver.resolve("stock", true), Duration::from_secs(90));
        assert_eq!(resolver.base("off"), None);
    }

    #[test]
    fn test_windowed_cron_uses_gap_inside_window() {
        let config = config(
            r#"
sources:
  - { id: office_hours, type: clock, schedule: "*/5 9-17 * * *" }
  - { id: weekday_morning, type: clock, schedule: "30 7 * * 1-5" }
"#,
        );

        let resolver = IntervalResolver::from_config(&config).unwrap();
        assert_eq!(resolver.base("office_hours"), Some(Duration::from_secs(300)));
        assert_eq!(resolver.resolve("office_hours", false), Duration::from_secs(300));
        // Sixteen samples span more than a weekend, so the weekday gap wins
        assert_eq!(resolver.base("weekday_morning"), Some(Duration::from_secs(86_400)));
    }
}
