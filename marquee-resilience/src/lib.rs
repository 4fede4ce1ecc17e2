//! Resilience patterns for Marquee
//!
//! Retry with configurable backoff for source executions, and a shutdown
//! coordinator the daemon polls between tasks.

pub mod backoff;
pub mod retry;
pub mod shutdown;

// Re-export commonly used types
pub use backoff::BackoffStrategy;
pub use retry::{RetryError, RetryExecutor, RetryOutcome, RetryPolicy, Retryable};
pub use shutdown::{ShutdownCoordinator, ShutdownError, ShutdownListener};
