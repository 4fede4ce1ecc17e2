//! `${NAME}` expansion inside per-source config maps

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domains::MarqueeConfig;
use crate::error::{ConfigError, ConfigResult};

static ENV_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$\{([A-Za-z_][A-Za-z0-9_]*)\}$").expect("env reference pattern is valid")
});

/// Name referenced by a value of the exact form `${NAME}`
///
/// Strings that merely contain a reference (`"prefix ${NAME}"`) are left alone.
pub fn env_reference(value: &str) -> Option<&str> {
    ENV_REFERENCE
        .captures(value)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
}

/// Replace every `${NAME}` value in every source's config map
///
/// `lookup` resolves a variable name; [`ConfigLoader`](crate::ConfigLoader)
/// passes the process environment.
pub fn expand_env_vars<F>(config: &mut MarqueeConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    for source in &mut config.sources {
        for value in source.config.values_mut() {
            expand_value(value, &source.id, &lookup)?;
        }
    }
    Ok(())
}

fn expand_value<F>(value: &mut Value, source_id: &str, lookup: &F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(text) => {
            if let Some(name) = env_reference(text).map(str::to_string) {
                let resolved = lookup(&name).ok_or_else(|| ConfigError::MissingEnvVar {
                    name: name.clone(),
                    source_id: source_id.to_string(),
                })?;
                log::debug!("Expanded ${{{}}} for source '{}'", name, source_id);
                *text = resolved;
            }
        }
        Value::Array(items) => {
            for item in items {
                expand_value(item, source_id, lookup)?;
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                expand_value(item, source_id, lookup)?;
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}
