//! Source type registry

use marquee_config::ConfigMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::{Source, SourceInstance};
use crate::error::{PluginError, PluginResult};

/// Builds a source from its task id and opaque config map
pub type SourceFactory = Arc<dyn Fn(&str, &ConfigMap) -> Box<dyn Source> + Send + Sync>;

/// Mapping from type key to constructor
///
/// Populated during bootstrap, then shared read-only behind an `Arc`.
#[derive(Default, Clone)]
pub struct SourceRegistry {
    factories: BTreeMap<String, SourceFactory>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `source_type`
    pub fn register<F>(&mut self, source_type: impl Into<String>, factory: F) -> PluginResult<()>
    where
        F: Fn(&str, &ConfigMap) -> Box<dyn Source> + Send + Sync + 'static,
    {
        let source_type = source_type.into();
        if self.factories.contains_key(&source_type) {
            return Err(PluginError::DuplicateType { source_type });
        }

        tracing::debug!(source_type = %source_type, "Source type registered");
        self.factories.insert(source_type, Arc::new(factory));
        Ok(())
    }

    /// Instantiate the source registered under `source_type`
    pub fn create(
        &self,
        source_type: &str,
        source_id: &str,
        config: &ConfigMap,
    ) -> PluginResult<SourceInstance> {
        let factory = self
            .factories
            .get(source_type)
            .ok_or_else(|| PluginError::UnknownType {
                source_type: source_type.to_string(),
                known: self.list_types(),
            })?;

        Ok(SourceInstance::new(
            source_id,
            source_type,
            factory(source_id, config),
        ))
    }

    /// Registered type keys, sorted
    pub fn list_types(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn contains(&self, source_type: &str) -> bool {
        self.factories.contains_key(source_type)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("types", &self.list_types())
            .finish()
    }
}
