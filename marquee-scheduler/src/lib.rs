//! Adaptive daemon scheduler for Marquee
//!
//! The daemon wakes on a fixed tick, decides per task whether its interval
//! has elapsed, and runs due tasks one after another through the
//! [`PluginExecutor`](marquee_execution::PluginExecutor). Tasks marked
//! live-eligible switch to a shorter interval while a [`LiveEventProbe`]
//! reports an event in progress.
//!
//! Base intervals come from `daemon.intervals`, then
//! `daemon.default_interval_seconds`, then the shortest gap between cron
//! firings. The cron-derived interval applies at every hour of every day; see
//! [`interval`] for schedules restricted to a window.

pub mod daemon;
pub mod error;
pub mod interval;
pub mod probe;
pub mod state;

pub use daemon::DaemonScheduler;
pub use error::{ProbeError, SchedulerError, SchedulerResult};
pub use interval::IntervalResolver;
pub use probe::{
    probe_from_config, FlagFileProbe, HttpLiveProbe, LiveEventProbe, NoLiveEvents, StaticProbe,
};
pub use state::{ScheduleState, TaskState};
