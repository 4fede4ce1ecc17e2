//! Declarative configuration for Marquee
//!
//! This crate parses the sources document (YAML or JSON) into an immutable,
//! validated [`MarqueeConfig`]. Validation covers id format, cron syntax,
//! numeric ranges and id uniqueness; `${NAME}` references inside per-source
//! config maps are resolved from the environment exactly once, at load time.

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use env::expand_env_vars;
pub use loader::{ConfigLoader, DocumentFormat};

// Re-export domain configurations
pub use domains::{
    daemon::{DaemonConfig, LiveConfig, ProbeConfig},
    logging::{LogFormat, LogLevel, LoggingConfig},
    output::OutputConfig,
    sources::{
        BackgroundMode, ConfigMap, FallbackConfig, RenderMode, RenderingConfig, RetryConfig,
        SourceDefinition,
    },
    MarqueeConfig,
};

// Re-export utilities
pub use domains::utils::serde_duration;
pub use validation::parse_schedule;
