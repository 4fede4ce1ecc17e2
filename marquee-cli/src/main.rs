use anyhow::{Context, Result};
use clap::Parser;
use marquee_config::{ConfigLoader, MarqueeConfig};
use marquee_logging::{init_logging, init_simple_tracing};
use tracing::{info, warn};

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::ListTypes) => {
            init_simple_tracing(cli.log_level.unwrap_or_default())?;
            return commands::handle_list_types();
        }
        Some(Commands::Init { output, force }) => {
            init_simple_tracing(cli.log_level.unwrap_or_default())?;
            return commands::handle_init(output, *force);
        }
        Some(Commands::Validate) => {
            init_simple_tracing(cli.log_level.unwrap_or_default())?;
            return commands::handle_validate(&cli.config);
        }
        None => {}
    }

    let Some(config) = load_config(&cli)? else {
        return Ok(());
    };

    info!("Marquee starting with {} sources", config.sources.len());

    if cli.daemon {
        commands::handle_daemon(config).await
    } else {
        commands::handle_run(&config, cli.source.as_deref())
            .await
            .map(|_| ())
    }
}

/// Load the sources document and initialise logging from it
///
/// A missing document is not an error: there is simply nothing to run.
fn load_config(cli: &Cli) -> Result<Option<MarqueeConfig>> {
    let loaded = ConfigLoader::new().load(&cli.config);

    match &loaded {
        Ok(Some(config)) => init_logging(&config.logging, cli.log_level)?,
        _ => init_simple_tracing(cli.log_level.unwrap_or_default())?,
    }

    let config = loaded
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    if config.is_none() {
        warn!(
            "Sources config not found at {}; nothing to run",
            cli.config.display()
        );
    }
    Ok(config)
}
