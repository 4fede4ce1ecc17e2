//! Logging initialisation for Marquee
//!
//! Installs one global `tracing` subscriber. Records emitted through the `log`
//! facade by the configuration and resilience crates are bridged into it.

use anyhow::Result;
use marquee_config::{LogFormat, LogLevel, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Environment variable consulted when no explicit level override is given
pub const RUST_LOG: &str = "RUST_LOG";

/// Initialise logging from the `logging` section
///
/// Filter precedence: `level_override` (the `--log-level` flag), then
/// `RUST_LOG`, then the configured level. Calling this more than once is
/// harmless; later calls leave the first subscriber in place.
pub fn init_logging(config: &LoggingConfig, level_override: Option<LogLevel>) -> Result<()> {
    let directive = filter_directive(
        config.level,
        level_override,
        std::env::var(RUST_LOG).ok().as_deref(),
    );

    let (env_filter, rejected) = build_filter(&directive);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    if let Some(bad) = rejected {
        tracing::warn!("Invalid log filter '{}', falling back to 'info'", bad);
    }

    Ok(())
}

/// Parse `directive`, or fall back to `info` and hand back the rejected text
fn build_filter(directive: &str) -> (EnvFilter, Option<String>) {
    match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(_) => (EnvFilter::new("info"), Some(directive.to_string())),
    }
}

/// Initialise text logging at the given level, ignoring any config document
///
/// Used before the document has been read, so load errors are still reported.
pub fn init_simple_tracing(level: LogLevel) -> Result<()> {
    init_logging(
        &LoggingConfig {
            level,
            format: LogFormat::Text,
        },
        None,
    )
}

/// Work out the `EnvFilter` directive from the three possible sources
pub fn filter_directive(
    configured: LogLevel,
    level_override: Option<LogLevel>,
    rust_log: Option<&str>,
) -> String {
    if let Some(level) = level_override {
        return level.to_string();
    }

    match rust_log.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive.to_string(),
        _ => configured.to_string(),
    }
}
