//! Source trait and the execution boundary around it

use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{SourceError, SourceResult};
use crate::metrics::ExecutionMetrics;
use crate::types::Content;

/// Contract implemented by every data source type
///
/// Implementations parse their own opaque config map when constructed and
/// keep no state between calls. They never implement execution or metrics
/// themselves: [`SourceInstance::execute`] does that once for all of them.
#[async_trait]
pub trait Source: Send + Sync {
    /// Check the parsed config; the error names the offending field(s)
    fn validate_config(&self) -> SourceResult<()>;

    /// Fetch upstream data; `Ok(None)` means nothing to render this cycle
    async fn fetch_data(&self) -> SourceResult<Option<Content>>;

    /// Last chance to drop content that was fetched successfully
    fn should_render(&self, _content: &Content) -> bool {
        true
    }
}

/// A source bound to a configured task id
pub struct SourceInstance {
    id: String,
    source_type: String,
    inner: Box<dyn Source>,
}

impl SourceInstance {
    pub fn new(id: impl Into<String>, source_type: impl Into<String>, inner: Box<dyn Source>) -> Self {
        Self {
            id: id.into(),
            source_type: source_type.into(),
            inner,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    /// Run the source once without a deadline
    pub async fn execute(&self) -> (Option<Content>, ExecutionMetrics) {
        self.run(None).await
    }

    /// Run the source once; an elapsed deadline fails with `"timeout"`
    pub async fn execute_with_timeout(&self, timeout: Duration) -> (Option<Content>, ExecutionMetrics) {
        self.run(Some(timeout)).await
    }

    /// Like [`execute_with_timeout`](Self::execute_with_timeout), but keeps the
    /// typed error so callers can decide whether to retry
    pub async fn execute_detailed(
        &self,
        timeout: Option<Duration>,
    ) -> (SourceResult<Option<Content>>, ExecutionMetrics) {
        let started_at = Utc::now();
        let clock = Instant::now();

        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, self.guarded_fetch()).await {
                Ok(result) => result,
                Err(_) => Err(SourceError::Timeout),
            },
            None => self.guarded_fetch().await,
        };

        let metrics =
            ExecutionMetrics::finished(&self.id, &self.source_type, started_at, clock.elapsed());
        let metrics = match &result {
            Ok(Some(content)) => metrics.succeeded(content.data_points()),
            Ok(None) => metrics,
            Err(e) => metrics.failed(e.to_string()),
        };

        match &result {
            Ok(Some(_)) => tracing::info!(
                source_id = %self.id,
                source_type = %self.source_type,
                duration_seconds = metrics.duration_seconds,
                data_points = metrics.data_points,
                status = metrics.status(),
                "Source execution succeeded"
            ),
            Ok(None) => tracing::info!(
                source_id = %self.id,
                source_type = %self.source_type,
                status = metrics.status(),
                "Source returned nothing to render"
            ),
            Err(e) => tracing::error!(
                source_id = %self.id,
                source_type = %self.source_type,
                duration_seconds = metrics.duration_seconds,
                error = %e,
                status = metrics.status(),
                "Source execution failed"
            ),
        }

        (result, metrics)
    }

    async fn run(&self, timeout: Option<Duration>) -> (Option<Content>, ExecutionMetrics) {
        let (result, metrics) = self.execute_detailed(timeout).await;
        (result.ok().flatten(), metrics)
    }

    /// validate, fetch and filter inside one failure boundary
    async fn guarded_fetch(&self) -> SourceResult<Option<Content>> {
        let inner = self.inner.as_ref();
        let attempt = async move {
            inner.validate_config()?;
            match inner.fetch_data().await? {
                Some(content) if inner.should_render(&content) => Ok(Some(content)),
                Some(_) => {
                    tracing::debug!(source_id = %self.id, "Content discarded by should_render");
                    Ok(None)
                }
                None => Ok(None),
            }
        };

        match AssertUnwindSafe(attempt).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(SourceError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

impl std::fmt::Debug for SourceInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceInstance")
            .field("id", &self.id)
            .field("source_type", &self.source_type)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Behavior {
        Lines(usize),
        Nothing,
        Fail,
        Invalid,
        Panic,
        Hang,
        Filtered,
    }

    struct TestSource {
        behavior: Behavior,
    }

    #[async_trait]
    impl Source for TestSource {
        fn validate_config(&self) -> SourceResult<()> {
            match self.behavior {
                Behavior::Invalid => Err(SourceError::invalid_field("api_key", "missing")),
                _ => Ok(()),
            }
        }

        async fn fetch_data(&self) -> SourceResult<Option<Content>> {
            match self.behavior {
                Behavior::Lines(n) => Ok(Some(Content::new(vec!["line".to_string(); n], "test"))),
                Behavior::Filtered => Ok(Some(Content::new(vec!["line".to_string()], "test"))),
                Behavior::Nothing | Behavior::Invalid => Ok(None),
                Behavior::Fail => Err(SourceError::fetch("upstream returned 503")),
                Behavior::Panic => panic!("parser exploded"),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(None)
                }
            }
        }

        fn should_render(&self, _content: &Content) -> bool {
            !matches!(self.behavior, Behavior::Filtered)
        }
    }

    fn instance(behavior: Behavior) -> SourceInstance {
        SourceInstance::new("task_1", "test", Box::new(TestSource { behavior }))
    }

    #[tokio::test]
    async fn test_success_counts_data_points() {
        let (content, metrics) = instance(Behavior::Lines(4)).execute().await;
        assert!(content.is_some());
        assert!(metrics.success);
        assert_eq!(metrics.error, None);
        assert_eq!(metrics.data_points, 4);
        assert_eq!(metrics.task_id, "task_1");
        assert_eq!(metrics.task_type, "test");
        assert!(metrics.completed_at >= metrics.started_at);
    }

    #[tokio::test]
    async fn test_nothing_to_render_is_not_an_error() {
        let (content, metrics) = instance(Behavior::Nothing).execute().await;
        assert!(content.is_none());
        assert!(!metrics.success);
        assert_eq!(metrics.error, None);
        assert_eq!(metrics.data_points, 0);
    }

    #[tokio::test]
    async fn test_fetch_error_is_captured() {
        let (content, metrics) = instance(Behavior::Fail).execute().await;
        assert!(content.is_none());
        assert!(!metrics.success);
        assert_eq!(metrics.error.as_deref(), Some("upstream returned 503"));
    }

    #[tokio::test]
    async fn test_validation_error_names_field() {
        let (result, metrics) = instance(Behavior::Invalid).execute_detailed(None).await;
        assert!(matches!(result, Err(SourceError::Validation { ref fields, .. }) if fields == &vec!["api_key".to_string()]));
        assert!(metrics.error.unwrap().contains("api_key"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let (content, metrics) = instance(Behavior::Panic).execute().await;
        assert!(content.is_none());
        assert!(!metrics.success);
        assert!(metrics.error.unwrap().contains("parser exploded"));
    }

    #[tokio::test]
    async fn test_should_render_false_discards_content() {
        let (content, metrics) = instance(Behavior::Filtered).execute().await;
        assert!(content.is_none());
        assert!(!metrics.success);
        assert_eq!(metrics.error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let (content, metrics) = instance(Behavior::Hang)
            .execute_with_timeout(Duration::from_secs(5))
            .await;
        assert!(content.is_none());
        assert!(!metrics.success);
        assert_eq!(metrics.error.as_deref(), Some("timeout"));
        assert!(metrics.duration_seconds >= 5.0);
    }
}
