//! Built-in source implementations

pub mod clock;
pub mod http_json;
pub mod static_text;

use marquee_config::ConfigMap;
use marquee_plugin::{SourceError, SourceResult};
use serde::de::DeserializeOwned;

/// Deserialize a source's opaque config map into its settings type
///
/// Type mismatches are reported against the whole `config` block; required
/// fields are checked by each source so the error can name them.
pub(crate) fn parse_settings<T: DeserializeOwned>(config: &ConfigMap) -> SourceResult<T> {
    serde_json::from_value(serde_json::Value::Object(config.clone()))
        .map_err(|e| SourceError::invalid_field("config", e.to_string()))
}

