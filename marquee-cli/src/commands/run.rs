//! One-shot batch run

use anyhow::Result;
use marquee_caching::FileStore;
use marquee_config::MarqueeConfig;
use marquee_execution::{BatchReport, PluginExecutor};
use marquee_plugin::Content;
use std::sync::Arc;

use super::{build_registry, build_renderer, warn_unknown_types};

/// Run every enabled source once, or only `source_id`
///
/// Per-task failures are reported, never returned: the batch itself only
/// fails when it cannot be set up.
pub async fn handle_run(config: &MarqueeConfig, source_id: Option<&str>) -> Result<BatchReport> {
    let registry = build_registry()?;
    warn_unknown_types(config, &registry);

    let cache = Arc::new(FileStore::<Content>::new(config.output.cache_directory.clone()));
    let executor = PluginExecutor::new(registry, build_renderer(&config.output), cache);

    let report = executor.run(config, source_id).await;
    print_report(&report);
    Ok(report)
}

fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        let marker = if outcome.succeeded() { "✅" } else { "❌" };
        let detail = match (&outcome.metrics.error, outcome.served_from_cache) {
            (Some(error), true) => format!("{} (served cached content)", error),
            (Some(error), false) => error.clone(),
            (None, _) if outcome.was_rendered() => format!("rendered {}", outcome.rendered.len()),
            (None, _) => "nothing to render".to_string(),
        };
        println!(
            "{} {} [{}] {:.2}s: {}",
            marker,
            outcome.source_id,
            outcome.source_type,
            outcome.metrics.duration_seconds,
            detail
        );
    }

    if !report.is_empty() {
        println!(
            "{} succeeded, {} failed, {} rendered",
            report.succeeded(),
            report.failed(),
            report.rendered()
        );
    }
}
