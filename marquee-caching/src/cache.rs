//! Core cache trait and types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

use crate::CacheResult;

/// Trait for types that can be cached
pub trait CacheValue: Clone + Debug + Serialize + DeserializeOwned + Send + Sync {}

impl<T> CacheValue for T where T: Clone + Debug + Serialize + DeserializeOwned + Send + Sync {}

/// Last-good value store keyed by task id
#[async_trait]
pub trait Cache<V: CacheValue + 'static>: Send + Sync {
    /// Get the stored entry regardless of age
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry<V>>>;

    /// Store an entry, replacing any previous one
    async fn put_entry(&self, key: &str, entry: CacheEntry<V>) -> CacheResult<()>;

    /// Remove the entry for `key`
    async fn remove(&self, key: &str) -> CacheResult<Option<CacheEntry<V>>>;

    /// Get the number of entries
    async fn len(&self) -> CacheResult<usize>;

    /// Store `value` stamped with the current time
    async fn put(&self, key: &str, value: V) -> CacheResult<()> {
        self.put_entry(key, CacheEntry::new(value)).await
    }

    /// Get the entry only if it is no older than `max_age`
    async fn get_fresh(&self, key: &str, max_age: Duration) -> CacheResult<Option<CacheEntry<V>>> {
        let now = Utc::now();
        Ok(self
            .get(key)
            .await?
            .filter(|entry| entry.is_fresh(max_age, now)))
    }

    /// Check if cache is empty
    async fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len().await? == 0)
    }
}

/// Cached value with the wall-clock time it was stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V) -> Self {
        Self::with_timestamp(value, Utc::now())
    }

    pub fn with_timestamp(value: V, stored_at: DateTime<Utc>) -> Self {
        Self { value, stored_at }
    }

    /// Age at `now`; entries stamped in the future count as age zero
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.stored_at).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) <= max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_entry_age() {
        let now = Utc::now();
        let entry = CacheEntry::with_timestamp("x".to_string(), now - ChronoDuration::hours(2));
        assert_eq!(entry.age(now), Duration::from_secs(7200));
        assert!(entry.is_fresh(Duration::from_secs(3 * 3600), now));
        assert!(entry.is_fresh(Duration::from_secs(2 * 3600), now));
        assert!(!entry.is_fresh(Duration::from_secs(3600), now));
    }

    #[test]
    fn test_future_entry_counts_as_new() {
        let now = Utc::now();
        let entry = CacheEntry::with_timestamp(1u32, now + ChronoDuration::minutes(5));
        assert_eq!(entry.age(now), Duration::ZERO);
    }
}
