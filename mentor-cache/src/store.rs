//! Key-value store backends.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use mentor_core::{KeyValueStore, MentorError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// MEMORY STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Volatile store, used in tests and when no cache directory is configured.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FILE STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Store persisted as a single JSON object on disk.
///
/// The whole map is loaded on open and rewritten on every change.
pub struct FileStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
    /// Serializes writers so a later save never lands before an earlier one
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens the store at `path`, loading existing contents if present.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(storage_error)?;
            }
        }

        let values = if path.exists() {
            info!("Loading store from {:?}", path);
            let contents = fs::read(&path).await.map_err(storage_error)?;
            if contents.is_empty() {
                HashMap::new()
            } else {
                serde_json::from_slice(&contents)
                    .map_err(|e| MentorError::StorageError(format!("corrupt store {:?}: {e}", path)))?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn save(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let contents = {
            let values = self.values.read();
            serde_json::to_vec(&*values)?
        };

        // Write atomically (write to temp, then rename)
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await.map_err(storage_error)?;
        file.write_all(&contents).await.map_err(storage_error)?;
        file.sync_all().await.map_err(storage_error)?;
        fs::rename(&temp_path, &self.path).await.map_err(storage_error)?;

        debug!("Store saved to {:?}", self.path);
        Ok(())
    }
}

fn storage_error(err: std::io::Error) -> MentorError {
    MentorError::StorageError(err.to_string())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.values.write().insert(key.to_string(), value);
        self.save().await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let existed = self.values.write().remove(key).is_some();
        if existed {
            self.save().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        store.set("k", "v".into()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileStore::open(&path).await.unwrap();
            store.set("teaching_examples", "[1,2]".into()).await.unwrap();
            store.set("other", "x".into()).await.unwrap();
            store.remove("other").await.unwrap();
        }

        let store = FileStore::open(&path).await.unwrap();
        assert_eq!(store.get("teaching_examples").await.unwrap().as_deref(), Some("[1,2]"));
        assert!(store.get("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let store = FileStore::open(&path).await.unwrap();
        store.set("k", "v".into()).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(FileStore::open(&path).await, Err(MentorError::StorageError(_))));
    }
}
