//! TTL envelopes over a durable key-value store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use mentor_core::KeyValueStore;

/// Stored form of a persisted value.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    value: Value,
    stored_at_ms: i64,
    ttl_ms: u64,
}

impl Envelope {
    fn is_expired(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.stored_at_ms) > i64::try_from(self.ttl_ms).unwrap_or(i64::MAX)
    }
}

/// Cache that survives restarts.
///
/// Never fails: storage and decoding problems are logged and treated as a
/// miss (reads) or ignored (writes).
///
/// Each [`clear`](Self::clear) advances an epoch; [`put_if_current`](Self::put_if_current)
/// refuses values fetched before the latest clear.
#[derive(Clone)]
pub struct PersistentCache {
    store: Arc<dyn KeyValueStore>,
    epoch: Arc<AtomicU64>,
    write_lock: Arc<Mutex<()>>,
}

impl PersistentCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            epoch: Arc::new(AtomicU64::new(0)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Current clear epoch. Read it before fetching the value to store.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Returns the value under `key` if present and fresh.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Persistent cache read failed");
                return None;
            }
        };

        let envelope: Envelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable persistent entry");
                self.purge(key).await;
                return None;
            }
        };

        if envelope.is_expired(Utc::now().timestamp_millis()) {
            debug!(key, "Persistent entry expired");
            self.purge(key).await;
            return None;
        }

        match serde_json::from_value(envelope.value) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Persistent entry has unexpected shape");
                None
            }
        }
    }

    /// Stores `value` under `key` for `ttl`.
    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let _guard = self.write_lock.lock().await;
        self.write(key, value, ttl).await;
    }

    /// Stores `value` only if nothing was cleared since `epoch`.
    ///
    /// Returns false when the value was discarded.
    pub async fn put_if_current<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration, epoch: u64) -> bool {
        let _guard = self.write_lock.lock().await;
        if self.epoch() != epoch {
            debug!(key, "Discarded value fetched before a clear");
            return false;
        }
        self.write(key, value, ttl).await;
        true
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Persistent cache encode failed");
                return;
            }
        };
        let envelope = Envelope {
            value,
            stored_at_ms: Utc::now().timestamp_millis(),
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
        };

        let raw = match serde_json::to_string(&envelope) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Persistent cache encode failed");
                return;
            }
        };
        if let Err(e) = self.store.set(key, raw).await {
            warn!(key, error = %e, "Persistent cache write failed");
        }
    }

    /// Removes the entry under `key`.
    pub async fn clear(&self, key: &str) {
        let _guard = self.write_lock.lock().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.remove(key).await;
    }

    /// Drops an unusable entry without counting as a clear.
    async fn purge(&self, key: &str) {
        let _guard = self.write_lock.lock().await;
        self.remove(key).await;
    }

    async fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            warn!(key, error = %e, "Persistent cache clear failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use mentor_core::{MentorError, Result};
    use serde_json::json;

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(MentorError::StorageError("disk gone".into()))
        }
        async fn set(&self, _key: &str, _value: String) -> Result<()> {
            Err(MentorError::StorageError("disk gone".into()))
        }
        async fn remove(&self, _key: &str) -> Result<()> {
            Err(MentorError::StorageError("disk gone".into()))
        }
    }

    #[tokio::test]
    async fn test_put_get() {
        let cache = PersistentCache::new(Arc::new(MemoryStore::new()));
        cache.put("examples", &json!([{ "id": "e1" }]), Duration::from_secs(600)).await;
        let value: Option<Value> = cache.get("examples").await;
        assert_eq!(value, Some(json!([{ "id": "e1" }])));
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed() {
        let store = Arc::new(MemoryStore::new());
        let stale = Envelope {
            value: json!([1]),
            stored_at_ms: Utc::now().timestamp_millis() - 20_000,
            ttl_ms: 10_000,
        };
        store.set("examples", serde_json::to_string(&stale).unwrap()).await.unwrap();

        let cache = PersistentCache::new(store.clone());
        assert!(cache.get::<Value>("examples").await.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = PersistentCache::new(Arc::new(MemoryStore::new()));
        cache.put("examples", &json!([]), Duration::from_secs(600)).await;
        cache.clear("examples").await;
        assert!(cache.get::<Value>("examples").await.is_none());
    }

    #[tokio::test]
    async fn test_put_after_clear_is_discarded() {
        let cache = PersistentCache::new(Arc::new(MemoryStore::new()));
        let epoch = cache.epoch();
        cache.clear("examples").await;

        assert!(!cache.put_if_current("examples", &json!(["old"]), Duration::from_secs(600), epoch).await);
        assert!(cache.get::<Value>("examples").await.is_none());

        let epoch = cache.epoch();
        assert!(cache.put_if_current("examples", &json!(["new"]), Duration::from_secs(600), epoch).await);
        assert_eq!(cache.get::<Value>("examples").await, Some(json!(["new"])));
    }

    #[tokio::test]
    async fn test_purging_stale_entry_keeps_epoch() {
        let store = Arc::new(MemoryStore::new());
        store.set("examples", "{not json".into()).await.unwrap();
        let cache = PersistentCache::new(store);

        let epoch = cache.epoch();
        assert!(cache.get::<Value>("examples").await.is_none());
        assert_eq!(cache.epoch(), epoch);
    }

    #[tokio::test]
    async fn test_huge_ttl_does_not_wrap() {
        let cache = PersistentCache::new(Arc::new(MemoryStore::new()));
        cache.put("examples", &json!([1]), Duration::MAX).await;
        assert_eq!(cache.get::<Value>("examples").await, Some(json!([1])));

        let envelope = Envelope {
            value: json!(null),
            stored_at_ms: 0,
            ttl_ms: u64::MAX,
        };
        assert!(!envelope.is_expired(Utc::now().timestamp_millis()));
    }

    #[tokio::test]
    async fn test_garbage_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        store.set("examples", "{not json".into()).await.unwrap();
        let cache = PersistentCache::new(store);
        assert!(cache.get::<Value>("examples").await.is_none());
    }

    #[tokio::test]
    async fn test_storage_failures_are_swallowed() {
        let cache = PersistentCache::new(Arc::new(BrokenStore));
        cache.put("examples", &json!([]), Duration::from_secs(600)).await;
        assert!(cache.get::<Value>("examples").await.is_none());
        cache.clear("examples").await;
    }
}
