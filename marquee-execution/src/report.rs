//! Per-task outcomes and batch summaries

use marquee_config::SourceDefinition;
use marquee_plugin::ExecutionMetrics;
use serde::Serialize;
use std::path::PathBuf;

/// Result of running one definition through the executor
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    pub source_id: String,
    pub source_type: String,
    /// Metrics of the final attempt
    pub metrics: ExecutionMetrics,
    /// Attempts made; zero when the task never started
    pub attempts: u32,
    /// Paths written by the renderer
    pub rendered: Vec<PathBuf>,
    /// Rendered content came from the fallback cache
    pub served_from_cache: bool,
    pub render_error: Option<String>,
}

impl TaskOutcome {
    pub fn new(definition: &SourceDefinition, metrics: ExecutionMetrics, attempts: u32) -> Self {
        Self {
            source_id: definition.id.clone(),
            source_type: definition.source_type.clone(),
            metrics,
            attempts,
            rendered: Vec::new(),
            served_from_cache: false,
            render_error: None,
        }
    }

    /// Outcome for a definition that could not be started at all
    pub fn not_started(definition: &SourceDefinition, error: impl ToString) -> Self {
        let metrics = ExecutionMetrics::failed_before_start(
            &definition.id,
            &definition.source_type,
            error.to_string(),
        );
        Self::new(definition, metrics, 0)
    }

    pub fn succeeded(&self) -> bool {
        self.metrics.success
    }

    pub fn was_rendered(&self) -> bool {
        !self.rendered.is_empty()
    }
}

/// Ordered outcomes of one batch pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<TaskOutcome>,
}

impl BatchReport {
    pub fn new(outcomes: Vec<TaskOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    /// Outcomes that ended with an error
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.metrics.error.is_some())
            .count()
    }

    pub fn rendered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.was_rendered()).count()
    }

    pub fn get(&self, source_id: &str) -> Option<&TaskOutcome> {
        self.outcomes.iter().find(|o| o.source_id == source_id)
    }
}
