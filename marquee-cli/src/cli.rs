//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use marquee_config::LogLevel;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the sources document
    #[arg(long, value_name = "PATH", default_value = "sources.yaml", global = true)]
    pub config: PathBuf,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Run only the source with this id
    #[arg(long, value_name = "ID", conflicts_with = "daemon")]
    pub source: Option<String>,

    /// Keep running and re-run sources as their intervals elapse
    #[arg(long)]
    pub daemon: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Load and validate the sources document
    Validate,

    /// List registered source types
    ListTypes,

    /// Write a sample sources document
    Init {
        /// Output file path
        #[arg(long, value_name = "PATH", default_value = "sources.yaml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}
