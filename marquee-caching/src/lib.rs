//! Caching for Marquee
//!
//! Stores the most recent successful value per task id together with the
//! time it was stored, so a failed run can fall back to recent content.

pub mod cache;
pub mod errors;
pub mod stores;

pub use cache::{Cache, CacheEntry, CacheValue};
pub use errors::{CacheError, CacheResult};
pub use stores::{file::FileStore, memory::InMemoryStore};
