//! Renderable content produced by sources

use marquee_config::{BackgroundMode, RenderMode, RenderingConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One renderable artifact's worth of data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Text lines, in display order
    pub lines: Vec<String>,

    /// Prefix for the rendered file names
    pub filename_prefix: String,

    #[serde(default = "default_layout")]
    pub layout: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<RenderMode>,

    #[serde(default)]
    pub background: BackgroundMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_query: Option<String>,

    /// Extra values handed to the renderer alongside the content
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Content {
    pub fn new(lines: Vec<String>, filename_prefix: impl Into<String>) -> Self {
        Self {
            lines,
            filename_prefix: filename_prefix.into(),
            layout: default_layout(),
            mode: None,
            background: BackgroundMode::default(),
            background_query: None,
            metadata: Map::new(),
        }
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    pub fn with_background(mut self, background: BackgroundMode) -> Self {
        self.background = background;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Size measure reported as `data_points`
    pub fn data_points(&self) -> usize {
        self.lines.len()
    }

    /// Apply configured rendering overrides
    ///
    /// Fields set in `rendering` replace the source's choice; unset fields
    /// keep it.
    pub fn apply_rendering(&mut self, rendering: &RenderingConfig) {
        if let Some(layout) = &rendering.layout {
            self.layout = layout.clone();
        }
        if let Some(mode) = rendering.mode {
            self.mode = Some(mode);
        }
        if let Some(background) = rendering.background {
            self.background = background;
        }
        if let Some(query) = &rendering.background_query {
            self.background_query = Some(query.clone());
        }
    }
}

fn default_layout() -> String {
    "centered".to_string()
}
