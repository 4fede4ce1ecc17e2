//! Execution of configured sources
//!
//! [`PluginExecutor`] runs a batch of enabled definitions once. Each
//! definition is isolated: construction failures, fetch errors, timeouts and
//! panics are recorded in its [`TaskOutcome`] and the batch moves on. Content
//! that survives retry and fallback policy is handed to a [`Renderer`].

pub mod error;
pub mod executor;
pub mod inflight;
pub mod render;
pub mod report;

pub use error::{ExecutionError, RenderError, RenderResult};
pub use executor::PluginExecutor;
pub use inflight::{InFlight, InFlightGuard};
pub use render::{JsonFileRenderer, Renderer};
pub use report::{BatchReport, TaskOutcome};
