//! Domain-specific configuration modules

pub mod daemon;
pub mod logging;
pub mod output;
pub mod sources;
pub mod utils;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::error::{ConfigError, ConfigResult};
use crate::validation::Validatable;

/// The whole sources document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarqueeConfig {
    /// Task definitions, in execution order
    pub sources: Vec<sources::SourceDefinition>,

    #[serde(default)]
    pub daemon: daemon::DaemonConfig,

    #[serde(default)]
    pub output: output::OutputConfig,

    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl MarqueeConfig {
    /// Validate every definition and every optional domain
    pub fn validate_all(&self) -> ConfigResult<()> {
        for source in &self.sources {
            source.validate()?;
        }

        let duplicates = self.duplicate_ids();
        if !duplicates.is_empty() {
            return Err(ConfigError::DuplicateIds { ids: duplicates });
        }

        self.daemon.validate()?;
        self.output.validate()?;
        self.logging.validate()?;

        for source_id in self.daemon.intervals.keys() {
            if self.find(source_id).is_none() {
                log::warn!(
                    "daemon.intervals references unknown source '{}'; ignoring",
                    source_id
                );
            }
        }

        Ok(())
    }

    /// Every id that appears more than once, sorted
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = BTreeSet::new();
        for source in &self.sources {
            if !seen.insert(source.id.as_str()) {
                duplicates.insert(source.id.clone());
            }
        }
        duplicates.into_iter().collect()
    }

    /// Enabled definitions in document order
    pub fn enabled_sources(&self) -> impl Iterator<Item = &sources::SourceDefinition> {
        self.sources.iter().filter(|s| s.enabled)
    }

    pub fn find(&self, source_id: &str) -> Option<&sources::SourceDefinition> {
        self.sources.iter().find(|s| s.id == source_id)
    }

    /// Generate a sample document
    pub fn generate_sample() -> String {
        let sample = r#"sources:
  - id: hello
    type: static_text
    schedule: "*/15 * * * *"
    config:
      lines: ["Hello", "World"]
  - id: wall_clock
    type: clock
    schedule: "* * * * *"
    timeout: 5
    retry:
      enabled: false
"#;
        sample.to_string()
    }
}
