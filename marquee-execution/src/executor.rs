//! Batch execution of configured sources

use chrono::Local;
use futures::stream::{self, StreamExt};
use marquee_caching::Cache;
use marquee_config::{MarqueeConfig, RetryConfig, SourceDefinition};
use marquee_plugin::{Content, ExecutionMetrics, SourceError, SourceInstance, SourceRegistry};
use marquee_resilience::{BackoffStrategy, RetryExecutor, RetryOutcome, RetryPolicy, Retryable};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ExecutionError;
use crate::inflight::InFlight;
use crate::render::Renderer;
use crate::report::{BatchReport, TaskOutcome};

/// Runs definitions through the registry, retry and fallback policy, and
/// the renderer
pub struct PluginExecutor {
    registry: Arc<SourceRegistry>,
    renderer: Arc<dyn Renderer>,
    cache: Arc<dyn Cache<Content>>,
    in_flight: Arc<InFlight>,
    concurrency: usize,
}

/// A failed attempt, carrying the metrics it produced
struct FailedAttempt {
    error: SourceError,
    metrics: ExecutionMetrics,
}

impl fmt::Display for FailedAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Retryable for FailedAttempt {
    fn is_retryable(&self) -> bool {
        self.error.is_retryable()
    }
}

fn retry_policy(retry: &RetryConfig) -> RetryPolicy {
    if retry.enabled {
        RetryPolicy::new(
            retry.max_attempts,
            BackoffStrategy::from_seconds(&retry.backoff_seconds),
        )
    } else {
        RetryPolicy::single_attempt()
    }
}

impl PluginExecutor {
    pub fn new(
        registry: Arc<SourceRegistry>,
        renderer: Arc<dyn Renderer>,
        cache: Arc<dyn Cache<Content>>,
    ) -> Self {
        Self {
            registry,
            renderer,
            cache,
            in_flight: Arc::new(InFlight::new()),
            concurrency: 1,
        }
    }

    /// Run up to `limit` definitions at once; results keep collection order
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Execute every enabled definition once, optionally only `filter`
    pub async fn run(&self, config: &MarqueeConfig, filter: Option<&str>) -> BatchReport {
        let selected: Vec<&SourceDefinition> = config
            .enabled_sources()
            .filter(|source| filter.map_or(true, |id| source.id == id))
            .collect();

        if selected.is_empty() {
            match filter {
                Some(id) => tracing::error!(source_id = %id, "Source not found or disabled"),
                None => tracing::warn!("No enabled sources to run"),
            }
            return BatchReport::default();
        }

        tracing::info!(
            count = selected.len(),
            concurrency = self.concurrency,
            "Running sources"
        );

        let outcomes: Vec<TaskOutcome> = stream::iter(selected)
            .map(|definition| self.execute_definition(definition))
            .buffered(self.concurrency)
            .collect()
            .await;

        let report = BatchReport::new(outcomes);
        tracing::info!(
            total = report.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            rendered = report.rendered(),
            "Batch complete"
        );
        report
    }

    /// Execute a single definition, isolating every failure in its outcome
    pub async fn execute_definition(&self, definition: &SourceDefinition) -> TaskOutcome {
        let Some(_guard) = self.in_flight.try_acquire(&definition.id) else {
            let error = ExecutionError::AlreadyRunning {
                source_id: definition.id.clone(),
            };
            tracing::warn!(source_id = %definition.id, "Skipping source: {}", error);
            return TaskOutcome::not_started(definition, error);
        };

        let instance = match self.registry.create(
            &definition.source_type,
            &definition.id,
            &definition.config,
        ) {
            Ok(instance) => instance,
            Err(e) => {
                let error = ExecutionError::from(e);
                tracing::error!(source_id = %definition.id, "Cannot create source: {}", error);
                return TaskOutcome::not_started(definition, error);
            }
        };

        tracing::info!(
            source_id = %definition.id,
            source_type = %definition.source_type,
            "Executing source"
        );

        let (content, metrics, attempts) = self.execute_with_retry(&instance, definition).await;
        let mut outcome = TaskOutcome::new(definition, metrics, attempts);

        let content = match content {
            Some(content) => {
                self.remember(definition, &content).await;
                Some(content)
            }
            None if outcome.metrics.error.is_some() && definition.fallback.use_cached => {
                let cached = self.cached_fallback(definition).await;
                outcome.served_from_cache = cached.is_some();
                cached
            }
            None => None,
        };

        if let Some(mut content) = content {
            content.apply_rendering(&definition.rendering);
            self.render(&content, &mut outcome).await;
        }

        outcome
    }

    async fn execute_with_retry(
        &self,
        instance: &SourceInstance,
        definition: &SourceDefinition,
    ) -> (Option<Content>, ExecutionMetrics, u32) {
        let timeout = Duration::from_secs(definition.timeout);
        let retry = RetryExecutor::new(retry_policy(&definition.retry));

        let result = retry
            .execute_with_context(|attempt| async move {
                tracing::debug!(source_id = %instance.id(), attempt, "Starting attempt");
                let (result, metrics) = instance.execute_detailed(Some(timeout)).await;
                match result {
                    Ok(content) => Ok((content, metrics)),
                    Err(error) => Err(FailedAttempt { error, metrics }),
                }
            })
            .await;

        match result {
            Ok(RetryOutcome {
                value: (content, metrics),
                attempts,
            }) => (content, metrics, attempts),
            Err(e) => {
                let attempts = e.attempts();
                let failed = e.into_inner();
                tracing::error!(
                    source_id = %definition.id,
                    attempts,
                    error = %failed.error,
                    "Source failed"
                );
                (None, failed.metrics, attempts)
            }
        }
    }

    async fn remember(&self, definition: &SourceDefinition, content: &Content) {
        if !definition.fallback.use_cached {
            return;
        }
        if let Err(e) = self.cache.put(&definition.id, content.clone()).await {
            tracing::warn!(source_id = %definition.id, "Failed to cache content: {}", e);
        }
    }

    async fn cached_fallback(&self, definition: &SourceDefinition) -> Option<Content> {
        let max_age = Duration::from_secs(definition.fallback.max_age_hours * 3600);
        match self.cache.get_fresh(&definition.id, max_age).await {
            Ok(Some(entry)) => {
                tracing::warn!(
                    source_id = %definition.id,
                    stored_at = %entry.stored_at,
                    "Serving cached content after failure"
                );
                Some(entry.value)
            }
            Ok(None) => {
                tracing::info!(
                    source_id = %definition.id,
                    max_age_hours = definition.fallback.max_age_hours,
                    "No cached content recent enough for fallback"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    source_id = %definition.id,
                    "Cache lookup failed: {}",
                    ExecutionError::from(e)
                );
                None
            }
        }
    }

    async fn render(&self, content: &Content, outcome: &mut TaskOutcome) {
        let timestamp = Local::now();
        match self
            .renderer
            .render(content, &outcome.source_id, timestamp, &content.metadata)
            .await
        {
            Ok(paths) => {
                tracing::info!(
                    source_id = %outcome.source_id,
                    files = paths.len(),
                    "Rendered output"
                );
                outcome.rendered = paths;
            }
            Err(e) => {
                let error = ExecutionError::from(e);
                tracing::error!(source_id = %outcome.source_id, "{}", error);
                outcome.render_error = Some(error.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use marquee_caching::{CacheEntry, InMemoryStore};
    use marquee_config::ConfigMap;
    use marquee_plugin::{Source, SourceResult};
    use parking_lot::Mutex;
    use serde_json::{Map, Value};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::error::RenderResult;

    /// Records every render call instead of writing files
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<(String, Content)>>,
    }

    #[async_trait]
    impl Renderer for RecordingRenderer {
        async fn render(
            &self,
            content: &Content,
            output_id: &str,
            _timestamp: chrono::DateTime<Local>,
            _extra_metadata: &Map<String, Value>,
        ) -> RenderResult<Vec<PathBuf>> {
            self.calls
                .lock()
                .push((output_id.to_string(), content.clone()));
            Ok(vec![PathBuf::from(format!("{}.png", output_id))])
        }
    }

    /// Fails `failures` times, then returns `lines`
    struct Scripted {
        failures: u32,
        calls: Arc<AtomicU32>,
        lines: Vec<String>,
    }

    #[async_trait]
    impl Source for Scripted {
        fn validate_config(&self) -> SourceResult<()> {
            Ok(())
        }

        async fn fetch_data(&self) -> SourceResult<Option<Content>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(SourceError::fetch(format!("failure {}", call + 1)));
            }
            if self.lines.is_empty() {
                return Ok(None);
            }
            Ok(Some(
                Content::new(self.lines.clone(), "scripted").with_layout("source_layout"),
            ))
        }
    }

    struct Misconfigured;

    #[async_trait]
    impl Source for Misconfigured {
        fn validate_config(&self) -> SourceResult<()> {
            Err(SourceError::invalid_field("url", "is required"))
        }

        async fn fetch_data(&self) -> SourceResult<Option<Content>> {
            Ok(None)
        }
    }

    fn config_value(config: &ConfigMap, key: &str) -> u64 {
        config.get(key).and_then(|v| v.as_u64()).unwrap_or(0)
    }

    struct Harness {
        executor: PluginExecutor,
        renderer: Arc<RecordingRenderer>,
        cache: Arc<InMemoryStore<Content>>,
        calls: Arc<AtomicU32>,
    }

    fn harness() -> Harness {
        let calls = Arc::new(AtomicU32::new(0));
        let mut registry = SourceRegistry::new();
        let counter = Arc::clone(&calls);
        registry
            .register("scripted", move |_id: &str, config: &ConfigMap| {
                let lines: Vec<String> = config
                    .get("lines")
                    .and_then(|v| v.as_array())
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                Box::new(Scripted {
                    failures: config_value(config, "failures") as u32,
                    calls: Arc::clone(&counter),
                    lines,
                }) as Box<dyn Source>
            })
            .unwrap();
        registry
            .register("misconfigured", |_id: &str, _config: &ConfigMap| {
                Box::new(Misconfigured) as Box<dyn Source>
            })
            .unwrap();

        let renderer = Arc::new(RecordingRenderer::default());
        let cache = Arc::new(InMemoryStore::<Content>::new());
        let executor = PluginExecutor::new(
            Arc::new(registry),
            renderer.clone(),
            cache.clone(),
        );
        Harness {
            executor,
            renderer,
            cache,
            calls,
        }
    }

    fn config(yaml: &str) -> MarqueeConfig {
        let config: MarqueeConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate_all().unwrap();
        config
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let h = harness();
        let config = config(
            r#"
sources:
  - { id: first, type: scripted, schedule: "* * * * *", config: { lines: [a, b] } }
  - { id: second, type: unknown_type, schedule: "* * * * *" }
  - { id: third, type: scripted, schedule: "* * * * *", config: { lines: [c] } }
"#,
        );

        let report = h.executor.run(&config, None).await;

        assert_eq!(report.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.rendered(), 2);
        let second = report.get("second").unwrap();
        assert_eq!(second.attempts, 0);
        assert!(second.metrics.error.as_ref().unwrap().contains("unknown_type"));

        let rendered: Vec<String> = h.renderer.calls.lock().iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(rendered, vec!["first", "third"]);
    }

    #[tokio::test]
    async fn test_filter_and_disabled() {
        let h = harness();
        let config = config(
            r#"
sources:
  - { id: a, type: scripted, schedule: "* * * * *", config: { lines: [x] } }
  - { id: b, type: scripted, schedule: "* * * * *", config: { lines: [y] }, enabled: false }
"#,
        );

        let report = h.executor.run(&config, Some("a")).await;
        assert_eq!(report.len(), 1);
        assert_eq!(report.outcomes[0].source_id, "a");

        assert!(h.executor.run(&config, Some("b")).await.is_empty());
        assert!(h.executor.run(&config, Some("zzz")).await.is_empty());
        assert_eq!(h.executor.run(&config, None).await.len(), 1);
    }

    #[tokio::test]
    async fn test_rendering_overrides_apply_partially() {
        let h = harness();
        let config = config(
            r#"
sources:
  - id: a
    type: scripted
    schedule: "* * * * *"
    config: { lines: [x] }
    rendering:
      background: unsplash
      background_query: harbour
"#,
        );

        h.executor.run(&config, None).await;

        let calls = h.renderer.calls.lock();
        let (_, content) = &calls[0];
        assert_eq!(content.layout, "source_layout");
        assert_eq!(content.background, marquee_config::BackgroundMode::Unsplash);
        assert_eq!(content.background_query.as_deref(), Some("harbour"));
    }

    #[tokio::test]
    async fn test_nothing_to_render_is_not_a_failure() {
        let h = harness();
        let config = config(
            "sources:\n  - { id: quiet, type: scripted, schedule: \"* * * * *\" }\n",
        );

        let report = h.executor.run(&config, None).await;
        let outcome = &report.outcomes[0];
        assert!(!outcome.succeeded());
        assert_eq!(outcome.metrics.error, None);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(report.failed(), 0);
        assert!(h.renderer.calls.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_until_success() {
        let h = harness();
        let config = config(
            r#"
sources:
  - id: flaky
    type: scripted
    schedule: "* * * * *"
    config: { lines: [ok], failures: 2 }
    retry: { max_attempts: 3, backoff_seconds: [1, 2] }
"#,
        );

        let report = h.executor.run(&config, None).await;
        let outcome = &report.outcomes[0];
        assert!(outcome.succeeded());
        assert_eq!(outcome.attempts, 3);
        assert_eq!(h.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausted_keeps_last_error() {
        let h = harness();
        let config = config(
            r#"
sources:
  - id: flaky
    type: scripted
    schedule: "* * * * *"
    config: { lines: [ok], failures: 5 }
    retry: { max_attempts: 2, backoff_seconds: [] }
"#,
        );

        let report = h.executor.run(&config, None).await;
        let outcome = &report.outcomes[0];
        assert!(!outcome.succeeded());
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.metrics.error.as_deref(), Some("failure 2"));
        assert!(!outcome.was_rendered());
    }

    #[tokio::test]
    async fn test_retry_disabled_makes_one_attempt() {
        let h = harness();
        let config = config(
            r#"
sources:
  - id: flaky
    type: scripted
    schedule: "* * * * *"
    config: { lines: [ok], failures: 1 }
    retry: { enabled: false, max_attempts: 5 }
"#,
        );

        let report = h.executor.run(&config, None).await;
        assert_eq!(report.outcomes[0].attempts, 1);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_validation_errors_are_not_retried() {
        let h = harness();
        let config = config(
            "sources:\n  - { id: bad, type: misconfigured, schedule: \"* * * * *\", retry: { max_attempts: 4 } }\n",
        );

        let report = h.executor.run(&config, None).await;
        let outcome = &report.outcomes[0];
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.metrics.error.as_ref().unwrap().contains("url"));
    }

    #[tokio::test]
    async fn test_fallback_serves_fresh_cache() {
        let h = harness();
        let cached = Content::new(vec!["yesterday".to_string()], "scripted");
        h.cache.put("flaky", cached).await.unwrap();

        let config = config(
            r#"
sources:
  - id: flaky
    type: scripted
    schedule: "* * * * *"
    config: { lines: [ok], failures: 9 }
    retry: { enabled: false }
    fallback: { use_cached: true, max_age_hours: 2 }
    rendering: { layout: fallback_layout }
"#,
        );

        let report = h.executor.run(&config, None).await;
        let outcome = &report.outcomes[0];
        assert!(outcome.served_from_cache);
        assert!(!outcome.succeeded());
        assert_eq!(outcome.metrics.error.as_deref(), Some("failure 1"));
        assert!(outcome.was_rendered());

        let calls = h.renderer.calls.lock();
        assert_eq!(calls[0].1.lines, vec!["yesterday"]);
        assert_eq!(calls[0].1.layout, "fallback_layout");
    }

    #[tokio::test]
    async fn test_fallback_ignores_stale_cache() {
        let h = harness();
        let stored_at: DateTime<Utc> = Utc::now() - chrono::Duration::hours(3);
        h.cache
            .put_entry(
                "flaky",
                CacheEntry::with_timestamp(Content::new(vec!["old".to_string()], "s"), stored_at),
            )
            .await
            .unwrap();

        let config = config(
            r#"
sources:
  - id: flaky
    type: scripted
    schedule: "* * * * *"
    config: { failures: 9 }
    retry: { enabled: false }
    fallback: { use_cached: true, max_age_hours: 2 }
"#,
        );

        let report = h.executor.run(&config, None).await;
        assert!(!report.outcomes[0].served_from_cache);
        assert!(h.renderer.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_success_is_cached_only_when_fallback_enabled() {
        let h = harness();
        let config = config(
            r#"
sources:
  - { id: kept, type: scripted, schedule: "* * * * *", config: { lines: [x] }, fallback: { use_cached: true } }
  - { id: skipped, type: scripted, schedule: "* * * * *", config: { lines: [y] } }
"#,
        );

        h.executor.run(&config, None).await;
        assert!(h.cache.get("kept").await.unwrap().is_some());
        assert!(h.cache.get("skipped").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_run_keeps_order() {
        let h = harness();
        let h = Harness {
            executor: h.executor.with_concurrency(4),
            ..h
        };
        let config = config(
            r#"
sources:
  - { id: a, type: scripted, schedule: "* * * * *", config: { lines: [a] } }
  - { id: b, type: scripted, schedule: "* * * * *", config: { lines: [b] } }
  - { id: c, type: scripted, schedule: "* * * * *", config: { lines: [c] } }
"#,
        );

        let report = h.executor.run(&config, None).await;
        let ids: Vec<&str> = report.outcomes.iter().map(|o| o.source_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(report.succeeded(), 3);
    }

    #[tokio::test]
    async fn test_running_id_is_rejected() {
        let h = harness();
        let config = config(
            "sources:\n  - { id: a, type: scripted, schedule: \"* * * * *\", config: { lines: [a] } }\n",
        );

        let _held = h.executor.in_flight.try_acquire("a").unwrap();
        let outcome = h.executor.execute_definition(&config.sources[0]).await;
        assert_eq!(outcome.metrics.error.as_deref(), Some("already running"));
        assert_eq!(outcome.attempts, 0);
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }
}
