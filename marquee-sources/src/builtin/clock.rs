//! Local wall-clock time

use async_trait::async_trait;
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use marquee_config::ConfigMap;
use marquee_plugin::{Content, Source, SourceError, SourceResult};
use serde::Deserialize;

use super::parse_settings;

const DEFAULT_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Deserialize)]
struct Settings {
    #[serde(default = "default_format")]
    format: String,

    #[serde(default)]
    title: Option<String>,
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

pub struct ClockSource {
    id: String,
    settings: SourceResult<Settings>,
}

impl ClockSource {
    pub const TYPE: &'static str = "clock";

    pub fn new(id: &str, config: &ConfigMap) -> Self {
        Self {
            id: id.to_string(),
            settings: parse_settings(config),
        }
    }

    fn settings(&self) -> SourceResult<&Settings> {
        let settings = self.settings.as_ref().map_err(Clone::clone)?;
        if settings.format.trim().is_empty() {
            return Err(SourceError::invalid_field("format", "cannot be empty"));
        }
        if StrftimeItems::new(&settings.format).any(|item| matches!(item, Item::Error)) {
            return Err(SourceError::invalid_field(
                "format",
                format!("'{}' is not a valid strftime format", settings.format),
            ));
        }
        Ok(settings)
    }
}

#[async_trait]
impl Source for ClockSource {
    fn validate_config(&self) -> SourceResult<()> {
        self.settings().map(|_| ())
    }

    async fn fetch_data(&self) -> SourceResult<Option<Content>> {
        let settings = self.settings()?;
        let now = Local::now();

        let mut lines = Vec::new();
        lines.extend(settings.title.iter().cloned());
        lines.push(now.format(&settings.format).to_string());

        Ok(Some(
            Content::new(lines, self.id.clone())
                .with_layout("clock")
                .with_metadata("captured_at", now.to_rfc3339()),
        ))
    }
}
