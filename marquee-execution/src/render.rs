//! Rendering collaborator boundary

use async_trait::async_trait;
use chrono::{DateTime, Local};
use marquee_plugin::Content;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::{RenderError, RenderResult};

/// Turns content into artifacts on disk
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `content` under `output_id`; returns the paths written
    async fn render(
        &self,
        content: &Content,
        output_id: &str,
        timestamp: DateTime<Local>,
        extra_metadata: &Map<String, Value>,
    ) -> RenderResult<Vec<PathBuf>>;
}

/// Writes `<directory>/<output_id>.json` with the content and its context
#[derive(Debug, Clone)]
pub struct JsonFileRenderer {
    directory: PathBuf,
}

#[derive(Serialize)]
struct Artifact<'a> {
    output_id: &'a str,
    timestamp: String,
    content: &'a Content,
    metadata: &'a Map<String, Value>,
}

impl JsonFileRenderer {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, output_id: &str) -> RenderResult<PathBuf> {
        let valid = !output_id.is_empty()
            && output_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(RenderError::InvalidOutputId(output_id.to_string()));
        }
        Ok(self.directory.join(format!("{}.json", output_id)))
    }
}

#[async_trait]
impl Renderer for JsonFileRenderer {
    async fn render(
        &self,
        content: &Content,
        output_id: &str,
        timestamp: DateTime<Local>,
        extra_metadata: &Map<String, Value>,
    ) -> RenderResult<Vec<PathBuf>> {
        let path = self.path_for(output_id)?;
        let artifact = Artifact {
            output_id,
            timestamp: timestamp.to_rfc3339(),
            content,
            metadata: extra_metadata,
        };
        let bytes = serde_json::to_vec_pretty(&artifact)?;

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|source| RenderError::Write {
                path: self.directory.clone(),
                source,
            })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| RenderError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(output_id = %output_id, path = %path.display(), "Artifact written");
        Ok(vec![path])
    }
}
