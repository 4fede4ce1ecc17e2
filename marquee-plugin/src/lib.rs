//! Source plugin contract for Marquee
//!
//! A *source* fetches external data and turns it into [`Content`]. Source
//! types are registered by name in a [`SourceRegistry`] during bootstrap;
//! the executor and the daemon ask the registry for a [`SourceInstance`] per
//! configured definition and call [`SourceInstance::execute`], which always
//! yields [`ExecutionMetrics`] whatever the source does.

pub mod core;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod types;

pub use crate::core::{Source, SourceInstance};
pub use error::{PluginError, PluginResult, SourceError, SourceResult};
pub use metrics::ExecutionMetrics;
pub use registry::{SourceFactory, SourceRegistry};
pub use types::Content;
