//! Built-in source types for Marquee
//!
//! The bootstrap table lives here: [`register_builtin_sources`] is the one
//! place that maps type keys to constructors.

pub mod builtin;

pub use builtin::clock::ClockSource;
pub use builtin::http_json::HttpJsonSource;
pub use builtin::static_text::StaticTextSource;

use marquee_plugin::{PluginResult, Source, SourceRegistry};

/// Register every built-in source type
pub fn register_builtin_sources(registry: &mut SourceRegistry) -> PluginResult<()> {
    registry.register(StaticTextSource::TYPE, |id, config| {
        Box::new(StaticTextSource::new(id, config)) as Box<dyn Source>
    })?;
    registry.register(ClockSource::TYPE, |id, config| {
        Box::new(ClockSource::new(id, config)) as Box<dyn Source>
    })?;
    registry.register(HttpJsonSource::TYPE, |id, config| {
        Box::new(HttpJsonSource::new(id, config)) as Box<dyn Source>
    })?;
    Ok(())
}

/// A registry holding only the built-in types
pub fn builtin_registry() -> PluginResult<SourceRegistry> {
    let mut registry = SourceRegistry::new();
    register_builtin_sources(&mut registry)?;
    Ok(registry)
}
