//! Output and cache locations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};

/// Where rendered artifacts and cached content are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub cache_directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("art_folder"),
            cache_directory: PathBuf::from(".cache"),
        }
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.directory.to_string_lossy(), "directory", self.domain_name())?;
        validate_required_string(
            &self.cache_directory.to_string_lossy(),
            "cache_directory",
            self.domain_name(),
        )
    }

    fn domain_name(&self) -> &'static str {
        "output"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_defaults() {
        let config = OutputConfig::default();
        assert_eq!(config.directory, PathBuf::from("art_folder"));
        assert_eq!(config.cache_directory, PathBuf::from(".cache"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_directory_rejected() {
        let config = OutputConfig {
            directory: PathBuf::new(),
            ..OutputConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
