//! JSON file store, survives across process runs
//!
//! One file per key, `<directory>/<key>.json`, holding the serialized
//! [`CacheEntry`]. Writes go to a temporary file first and are renamed into
//! place so a crash never leaves a half-written entry behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::{
    cache::{Cache, CacheEntry, CacheValue},
    CacheError, CacheResult,
};
use std::marker::PhantomData;

pub struct FileStore<V> {
    directory: PathBuf,
    _value: PhantomData<fn() -> V>,
}

impl<V: CacheValue + 'static> FileStore<V> {
    /// Store rooted at `directory`; the directory is created on first write
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            _value: PhantomData,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> CacheResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.directory.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl<V: CacheValue + 'static> Cache<V> for FileStore<V> {
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry<V>>> {
        let path = self.path_for(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: CacheEntry<V> = serde_json::from_slice(&bytes)?;
        Ok(Some(entry))
    }

    async fn put_entry(&self, key: &str, entry: CacheEntry<V>) -> CacheResult<()> {
        let path = self.path_for(key)?;
        let bytes = serde_json::to_vec_pretty(&entry)?;

        tokio::fs::create_dir_all(&self.directory).await?;
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, &bytes).await?;
        tokio::fs::rename(&staging, &path).await?;

        log::debug!("Cached entry for '{}' at {}", key, path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<Option<CacheEntry<V>>> {
        let previous = self.get(key).await?;
        if previous.is_some() {
            tokio::fs::remove_file(self.path_for(key)?).await?;
        }
        Ok(previous)
    }

    async fn len(&self) -> CacheResult<usize> {
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut count = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().and_then(|ext| ext.to_str()) == Some("json") {
                count += 1;
            }
        }
        Ok(count)
    }
}
