//! The ancillary-cache collaborator: on-disk storage for blobs the session
//! core needs between runs but that don't belong in the keyring (the
//! client-configuration record, the cached server list).

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::keyring::persistence_error;

/// Persists opaque JSON blobs under string keys, surviving process restarts.
#[async_trait]
pub trait AncillaryCache: Send + Sync {
    /// Load the blob stored at `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` at `key`, overwriting any existing entry.
    async fn save(&self, key: &str, value: &Value) -> Result<()>;

    /// Remove the entry at `key`, if present.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Whether an entry exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.load(key).await?.is_some())
    }
}

/// A directory-backed [`AncillaryCache`].
///
/// Each key maps to one `<key>.json` file under `dir`. Writes go to a
/// sibling temp file first and are renamed into place, so a crash mid-write
/// never leaves a half-written file behind for the next load to choke on.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Use `dir` as the cache root. The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn tmp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json.tmp"))
    }
}

#[async_trait]
impl AncillaryCache for FileCache {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| persistence_error(&path.display().to_string(), e))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(persistence_error(&path.display().to_string(), e)),
        }
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| persistence_error(&self.dir.display().to_string(), e))?;

        let tmp_path = self.tmp_path_for(key);
        let bytes = serde_json::to_vec_pretty(value)?;
        {
            let mut file = fs::File::create(&tmp_path)
                .await
                .map_err(|e| persistence_error(&tmp_path.display().to_string(), e))?;
            file.write_all(&bytes)
                .await
                .map_err(|e| persistence_error(&tmp_path.display().to_string(), e))?;
            file.sync_all()
                .await
                .map_err(|e| persistence_error(&tmp_path.display().to_string(), e))?;
        }

        let final_path = self.path_for(key);
        fs::rename(&tmp_path, &final_path)
            .await
            .map_err(|e| persistence_error(&final_path.display().to_string(), e))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(persistence_error(&path.display().to_string(), e)),
        }
    }
}

/// An in-memory [`AncillaryCache`], for tests.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl InMemoryCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AncillaryCache for InMemoryCache {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn file_cache_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());

        assert!(!cache.exists("serverlist").await.unwrap());
        cache.save("serverlist", &json!({"servers": [1, 2]})).await.unwrap();
        assert!(cache.exists("serverlist").await.unwrap());
        assert_eq!(cache.load("serverlist").await.unwrap(), Some(json!({"servers": [1, 2]})));
    }

    #[tokio::test]
    async fn file_cache_overwrites_on_second_save() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());

        cache.save("k", &json!({"v": 1})).await.unwrap();
        cache.save("k", &json!({"v": 2})).await.unwrap();
        assert_eq!(cache.load("k").await.unwrap(), Some(json!({"v": 2})));
    }

    #[tokio::test]
    async fn file_cache_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        cache.remove("missing").await.unwrap();
        cache.save("k", &json!(1)).await.unwrap();
        cache.remove("k").await.unwrap();
        cache.remove("k").await.unwrap();
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn in_memory_cache_round_trips() {
        let cache = InMemoryCache::new();
        cache.save("k", &json!("v")).await.unwrap();
        assert_eq!(cache.load("k").await.unwrap(), Some(json!("v")));
    }
}
