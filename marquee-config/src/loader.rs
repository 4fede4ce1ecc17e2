//! Configuration loading

use std::path::Path;

use crate::domains::MarqueeConfig;
use crate::env::expand_env_vars;
use crate::error::ConfigResult;

/// Document syntax, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// `.json` selects JSON, anything else is read as YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Loads the sources document and resolves `${NAME}` references
pub struct ConfigLoader {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl ConfigLoader {
    /// Loader that resolves references from the process environment
    pub fn new() -> Self {
        Self {
            lookup: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Loader with a custom variable source
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Load the document at `path`
    ///
    /// Returns `Ok(None)` when the file does not exist so callers can fall
    /// back to running without sources.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<Option<MarqueeConfig>> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Sources config not found at {}", path.display());
            return Ok(None);
        }
        self.from_file(path).map(Some)
    }

    /// Load the document at `path`, failing if it is missing
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<MarqueeConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = self.from_content(&content, DocumentFormat::from_path(path))?;
        log::info!(
            "Loaded {} source definition(s) from {}",
            config.sources.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse, validate, then expand environment references
    pub fn from_content(&self, content: &str, format: DocumentFormat) -> ConfigResult<MarqueeConfig> {
        let mut config: MarqueeConfig = match format {
            DocumentFormat::Yaml => serde_yaml::from_str(content)?,
            DocumentFormat::Json => serde_json::from_str(content)?,
        };

        config.validate_all()?;
        expand_env_vars(&mut config, |name| (self.lookup)(name))?;

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
