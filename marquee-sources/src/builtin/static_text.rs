//! Fixed text, mostly useful for signage and smoke tests

use async_trait::async_trait;
use marquee_config::ConfigMap;
use marquee_plugin::{Content, Source, SourceError, SourceResult};
use serde::Deserialize;

use super::parse_settings;

#[derive(Debug, Clone, Deserialize)]
struct Settings {
    #[serde(default)]
    lines: Option<Vec<String>>,

    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    layout: Option<String>,
}

/// Renders the configured `lines` as they are
pub struct StaticTextSource {
    id: String,
    settings: SourceResult<Settings>,
}

impl StaticTextSource {
    pub const TYPE: &'static str = "static_text";

    pub fn new(id: &str, config: &ConfigMap) -> Self {
        Self {
            id: id.to_string(),
            settings: parse_settings(config),
        }
    }

    fn settings(&self) -> SourceResult<&Settings> {
        let settings = self.settings.as_ref().map_err(Clone::clone)?;
        match &settings.lines {
            None => Err(SourceError::invalid_field("lines", "is required")),
            Some(lines) if lines.is_empty() => {
                Err(SourceError::invalid_field("lines", "must contain at least one line"))
            }
            Some(_) => Ok(settings),
        }
    }
}

#[async_trait]
impl Source for StaticTextSource {
    fn validate_config(&self) -> SourceResult<()> {
        self.settings().map(|_| ())
    }

    async fn fetch_data(&self) -> SourceResult<Option<Content>> {
        let settings = self.settings()?;

        let mut lines = Vec::new();
        lines.extend(settings.title.iter().cloned());
        lines.extend(settings.lines.iter().flatten().cloned());

        let mut content = Content::new(lines, self.id.clone());
        if let Some(layout) = &settings.layout {
            content = content.with_layout(layout.clone());
        }
        Ok(Some(content))
    }
}
