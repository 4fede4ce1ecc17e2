//! In-memory store, lives as long as the process

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    cache::{Cache, CacheEntry, CacheValue},
    CacheResult,
};

/// Simple in-memory cache
pub struct InMemoryStore<V> {
    store: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
}

impl<V: CacheValue + 'static> InMemoryStore<V> {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<V: CacheValue + 'static> Default for InMemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V: CacheValue + 'static> Cache<V> for InMemoryStore<V> {
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry<V>>> {
        Ok(self.store.read().get(key).cloned())
    }

    async fn put_entry(&self, key: &str, entry: CacheEntry<V>) -> CacheResult<()> {
        self.store.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<Option<CacheEntry<V>>> {
        Ok(self.store.write().remove(key))
    }

    async fn len(&self) -> CacheResult<usize> {
        Ok(self.store.read().len())
    }
}
