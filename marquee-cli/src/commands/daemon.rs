//! Long-running daemon mode

use anyhow::{Context, Result};
use marquee_caching::InMemoryStore;
use marquee_config::MarqueeConfig;
use marquee_execution::PluginExecutor;
use marquee_plugin::Content;
use marquee_resilience::ShutdownCoordinator;
use marquee_scheduler::{probe_from_config, DaemonScheduler};
use std::sync::Arc;

use super::{build_registry, build_renderer, warn_unknown_types};

/// Run the adaptive scheduler until Ctrl-C
pub async fn handle_daemon(config: MarqueeConfig) -> Result<()> {
    let registry = build_registry()?;
    warn_unknown_types(&config, &registry);

    let cache = Arc::new(InMemoryStore::<Content>::new());
    let executor = Arc::new(PluginExecutor::new(
        registry,
        build_renderer(&config.output),
        cache,
    ));

    let probe = probe_from_config(&config.daemon.live.probe)
        .context("Failed to set up live-event probe")?;
    let scheduler = DaemonScheduler::new(executor, Arc::new(config), probe)
        .context("Failed to start daemon scheduler")?;

    let shutdown = Arc::new(ShutdownCoordinator::new());
    let signal_task = shutdown.shutdown_on_ctrl_c();

    println!("🚀 Marquee daemon running; press Ctrl-C to stop");
    scheduler.run(shutdown.subscribe()).await;

    signal_task.abort();
    println!("👋 Marquee daemon stopped");
    Ok(())
}
