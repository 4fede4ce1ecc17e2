//! Live-event probes

use async_trait::async_trait;
use marquee_config::ProbeConfig;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ProbeError, SchedulerResult};

/// Answers "is a time-sensitive event in progress right now?"
#[async_trait]
pub trait LiveEventProbe: Send + Sync {
    async fn is_live(&self) -> Result<bool, ProbeError>;

    /// Name used in log lines
    fn name(&self) -> &'static str;
}

/// Never live
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLiveEvents;

#[async_trait]
impl LiveEventProbe for NoLiveEvents {
    async fn is_live(&self) -> Result<bool, ProbeError> {
        Ok(false)
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Flag toggled from code
#[derive(Debug, Default)]
pub struct StaticProbe {
    live: AtomicBool,
}

impl StaticProbe {
    pub fn new(live: bool) -> Self {
        Self {
            live: AtomicBool::new(live),
        }
    }

    pub fn set(&self, live: bool) {
        self.live.store(live, Ordering::SeqCst);
    }
}

#[async_trait]
impl LiveEventProbe for StaticProbe {
    async fn is_live(&self) -> Result<bool, ProbeError> {
        Ok(self.live.load(Ordering::SeqCst))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// GETs a JSON document and reads a boolean at a JSON pointer
///
/// An empty pointer means the whole body must be a boolean.
#[derive(Debug, Clone)]
pub struct HttpLiveProbe {
    client: reqwest::Client,
    url: String,
    pointer: String,
}

impl HttpLiveProbe {
    pub fn new(
        url: impl Into<String>,
        pointer: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            pointer: pointer.into(),
        })
    }
}

#[async_trait]
impl LiveEventProbe for HttpLiveProbe {
    async fn is_live(&self) -> Result<bool, ProbeError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        let value = body
            .pointer(&self.pointer)
            .ok_or_else(|| ProbeError::MissingPointer(self.pointer.clone()))?;
        value
            .as_bool()
            .ok_or_else(|| ProbeError::NotBoolean(self.pointer.clone()))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Live while a file exists
#[derive(Debug, Clone)]
pub struct FlagFileProbe {
    path: PathBuf,
}

impl FlagFileProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LiveEventProbe for FlagFileProbe {
    async fn is_live(&self) -> Result<bool, ProbeError> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    fn name(&self) -> &'static str {
        "flag_file"
    }
}

/// Build the probe described by the `daemon.live.probe` section
pub fn probe_from_config(config: &ProbeConfig) -> SchedulerResult<Arc<dyn LiveEventProbe>> {
    let probe: Arc<dyn LiveEventProbe> = match config {
        ProbeConfig::None => Arc::new(NoLiveEvents),
        ProbeConfig::Http {
            url,
            pointer,
            timeout_seconds,
        } => Arc::new(HttpLiveProbe::new(url, pointer, *timeout_seconds)?),
        ProbeConfig::FlagFile { path } => Arc::new(FlagFileProbe::new(path)),
    };
    Ok(probe)
}
