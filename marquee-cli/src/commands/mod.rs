//! CLI command implementations

pub mod config;
pub mod daemon;
pub mod run;

pub use config::*;
pub use daemon::*;
pub use run::*;

use anyhow::{Context, Result};
use marquee_config::{MarqueeConfig, OutputConfig};
use marquee_execution::{JsonFileRenderer, Renderer};
use marquee_plugin::SourceRegistry;
use std::sync::Arc;

/// Registry with every built-in source type
pub fn build_registry() -> Result<Arc<SourceRegistry>> {
    let registry =
        marquee_sources::builtin_registry().context("Failed to register built-in sources")?;
    Ok(Arc::new(registry))
}

pub fn build_renderer(output: &OutputConfig) -> Arc<dyn Renderer> {
    Arc::new(JsonFileRenderer::new(output.directory.clone()))
}

/// Warn about definitions whose type nothing registered
///
/// Such definitions still run and fail in isolation; this only surfaces the
/// problem before the first execution.
pub fn warn_unknown_types(config: &MarqueeConfig, registry: &SourceRegistry) {
    for source in config.enabled_sources() {
        if !registry.contains(&source.source_type) {
            tracing::warn!(
                source_id = %source.id,
                source_type = %source.source_type,
                "No source type registered under this name"
            );
        }
    }
}
