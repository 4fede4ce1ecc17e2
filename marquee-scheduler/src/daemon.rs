//! The daemon tick loop

use marquee_config::{LiveConfig, MarqueeConfig, ProbeConfig};
use marquee_execution::{PluginExecutor, TaskOutcome};
use marquee_resilience::ShutdownListener;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::SchedulerResult;
use crate::interval::IntervalResolver;
use crate::probe::LiveEventProbe;
use crate::state::ScheduleState;

/// Long-running scheduler owning all schedule state
///
/// Runs due tasks sequentially on a single tokio task, so the state needs no
/// locking.
pub struct DaemonScheduler {
    executor: Arc<PluginExecutor>,
    config: Arc<MarqueeConfig>,
    probe: Arc<dyn LiveEventProbe>,
    intervals: IntervalResolver,
    state: ScheduleState,
    tick: Duration,
}

impl DaemonScheduler {
    pub fn new(
        executor: Arc<PluginExecutor>,
        config: Arc<MarqueeConfig>,
        probe: Arc<dyn LiveEventProbe>,
    ) -> SchedulerResult<Self> {
        let intervals = IntervalResolver::from_config(&config)?;
        let tick = config.daemon.tick();

        let live = &config.daemon.live;
        if live.probe != ProbeConfig::None && !live.has_eligible_sources() {
            tracing::warn!(
                probe = probe.name(),
                "Live-event probe configured but no source is eligible for the live interval"
            );
        }
        Ok(Self {
            executor,
            config,
            probe,
            intervals,
            state: ScheduleState::new(),
            tick,
        })
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    /// Tick until shutdown is requested
    ///
    /// A shutdown request is honoured between tasks; the task currently
    /// executing always runs to completion.
    pub async fn run(mut self, mut shutdown: ShutdownListener) {
        tracing::info!(
            tick_seconds = self.tick.as_secs(),
            sources = self.config.enabled_sources().count(),
            probe = self.probe.name(),
            "Daemon started"
        );

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                _ = ticker.tick() => {}
            }

            self.run_tick(&shutdown).await;
            if shutdown.is_triggered() {
                break;
            }
        }

        tracing::info!("Daemon stopped");
    }

    /// Consider every enabled task once and run those that are due
    pub async fn run_tick(&mut self, shutdown: &ShutdownListener) -> Vec<TaskOutcome> {
        let config = Arc::clone(&self.config);
        let live_config = &config.daemon.live;
        let mut live_now: Option<bool> = None;
        let mut outcomes = Vec::new();

        for source in config.enabled_sources() {
            let eligible = live_config.is_eligible(&source.id, &source.source_type);
            let live = if eligible {
                match live_now {
                    Some(live) => live,
                    None => {
                        let live = self.query_probe(live_config).await;
                        live_now = Some(live);
                        live
                    }
                }
            } else {
                false
            };

            let interval = self.intervals.resolve(&source.id, live);
            let state = self.state.state(&source.id, interval, Instant::now());
            tracing::trace!(
                source_id = %source.id,
                state = ?state,
                interval_seconds = interval.as_secs(),
                live,
                "Considered source"
            );

            if !state.should_run() {
                continue;
            }

            if shutdown.is_triggered() {
                tracing::info!("Shutdown requested; skipping remaining sources");
                break;
            }

            let outcome = self.executor.execute_definition(source).await;
            self.state.mark_run(&source.id, Instant::now());
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn query_probe(&self, live_config: &LiveConfig) -> bool {
        match self.probe.is_live().await {
            Ok(live) => {
                if live {
                    tracing::debug!(
                        probe = self.probe.name(),
                        interval_seconds = live_config.interval_seconds.as_secs(),
                        "Live event in progress; using live interval"
                    );
                }
                live
            }
            Err(e) => {
                tracing::warn!(probe = self.probe.name(), "Live-event probe failed: {}", e);
                false
            }
        }
    }
}
