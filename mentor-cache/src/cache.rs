//! In-memory TTL cache for decoded responses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use mentor_core::constants::{MAX_CACHE_ENTRIES, SWEEP_INTERVAL};

use crate::fingerprint::Fingerprint;

/// Cache entry with TTL.
#[derive(Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }
}

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Interval of the background sweep, in seconds
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: MAX_CACHE_ENTRIES,
            sweep_interval_seconds: SWEEP_INTERVAL.as_secs(),
        }
    }
}

/// In-memory response cache keyed by request fingerprint.
///
/// Thread-safe. Time is read from `tokio::time`, so expiry follows a paused
/// test clock.
///
/// Every invalidation advances an epoch. A response fetched before an
/// invalidation is stored with [`put_if_current`](Self::put_if_current) and
/// is dropped instead of resurrecting the invalidated data.
pub struct ResponseCache {
    entries: RwLock<HashMap<Fingerprint, CacheEntry>>,
    epoch: AtomicU64,
    config: CacheConfig,
}

impl ResponseCache {
    /// Creates a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            epoch: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the cached value if it is still fresh.
    ///
    /// A stale entry is removed and reported as a miss.
    pub fn get(&self, key: &Fingerprint) -> Option<Value> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
            debug!(key = %key, "Purged stale cache entry");
        }
        None
    }

    /// Current invalidation epoch. Read it before starting a fetch.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Stores a value, replacing any previous entry for the key.
    pub fn put(&self, key: Fingerprint, value: Value, ttl: Duration) {
        let mut entries = self.entries.write();
        Self::insert(&mut entries, &self.config, key, value, ttl);
    }

    /// Stores a value only if no invalidation happened since `epoch`.
    ///
    /// Returns false when the value was discarded.
    pub fn put_if_current(&self, key: Fingerprint, value: Value, ttl: Duration, epoch: u64) -> bool {
        let mut entries = self.entries.write();
        // Invalidations bump the epoch under the same lock
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(key = %key, "Discarded response fetched before an invalidation");
            return false;
        }
        Self::insert(&mut entries, &self.config, key, value, ttl);
        true
    }

    fn insert(
        entries: &mut HashMap<Fingerprint, CacheEntry>,
        config: &CacheConfig,
        key: Fingerprint,
        value: Value,
        ttl: Duration,
    ) {
        let now = Instant::now();

        if !entries.contains_key(&key) && entries.len() >= config.max_entries {
            entries.retain(|_, e| !e.is_expired(now));
            if entries.len() >= config.max_entries {
                if let Some(oldest_key) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.stored_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest_key);
                }
            }
        }

        entries.insert(key, CacheEntry {
            value,
            stored_at: now,
            ttl,
        });
    }

    /// Removes one entry. Returns true if it existed.
    pub fn invalidate(&self, key: &Fingerprint) -> bool {
        let mut entries = self.entries.write();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        entries.remove(key).is_some()
    }

    /// Removes every entry whose path starts with `prefix`.
    ///
    /// Returns the number of removed entries.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let before = entries.len();
        entries.retain(|k, _| !k.has_path_prefix(prefix));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(prefix, removed, "Invalidated cache entries");
        }
        removed
    }

    /// Clears all cached entries.
    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        entries.clear();
    }

    /// Removes all expired entries. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        before - entries.len()
    }

    /// Returns the number of cached entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired(now)).count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
            capacity: self.config.max_entries,
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Clone, Debug)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub valid_entries: usize,
    pub capacity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentor_core::{Method, RequestBody};
    use serde_json::json;

    fn key(endpoint: &str) -> Fingerprint {
        Fingerprint::new(Method::Get, endpoint, &RequestBody::Empty)
    }

    const TTL: Duration = Duration::from_secs(30);

    #[tokio::test(start_paused = true)]
    async fn test_cache_put_get() {
        let cache = ResponseCache::new();
        cache.put(key("/api/progress"), json!({ "mastered": 2 }), TTL);
        assert_eq!(cache.get(&key("/api/progress")), Some(json!({ "mastered": 2 })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_miss() {
        let cache = ResponseCache::new();
        assert!(cache.get(&key("/api/progress")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_put_overwrites() {
        let cache = ResponseCache::new();
        cache.put(key("/a"), json!(1), TTL);
        cache.put(key("/a"), json!(2), TTL);
        assert_eq!(cache.get(&key("/a")), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_fresh_at_exact_ttl() {
        let cache = ResponseCache::new();
        cache.put(key("/a"), json!(1), TTL);
        tokio::time::advance(TTL).await;
        assert!(cache.get(&key("/a")).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_is_purged_on_get() {
        let cache = ResponseCache::new();
        cache.put(key("/a"), json!(1), TTL);
        tokio::time::advance(TTL + Duration::from_millis(1)).await;
        assert!(cache.get(&key("/a")).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate() {
        let cache = ResponseCache::new();
        cache.put(key("/a"), json!(1), TTL);
        assert!(cache.invalidate(&key("/a")));
        assert!(!cache.invalidate(&key("/a")));
        assert!(cache.get(&key("/a")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_prefix_covers_queries_and_details() {
        let cache = ResponseCache::new();
        cache.put(key("/api/teacher/activities?classroom_id=c1"), json!([]), TTL);
        cache.put(key("/api/teacher/activities/a1/questions"), json!({}), TTL);
        cache.put(key("/api/teacher/classrooms"), json!([]), TTL);

        assert_eq!(cache.invalidate_prefix("/api/teacher/activities"), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("/api/teacher/classrooms")).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_all() {
        let cache = ResponseCache::new();
        cache.put(key("/a"), json!(1), TTL);
        cache.put(key("/b"), json!(2), TTL);
        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_after_invalidation_is_discarded() {
        let cache = ResponseCache::new();
        let epoch = cache.epoch();
        cache.invalidate_prefix("/api/progress");

        assert!(!cache.put_if_current(key("/api/progress"), json!({ "mastered": 1 }), TTL, epoch));
        assert!(cache.get(&key("/api/progress")).is_none());

        let epoch = cache.epoch();
        assert!(cache.put_if_current(key("/api/progress"), json!({ "mastered": 2 }), TTL, epoch));
        assert_eq!(cache.get(&key("/api/progress")), Some(json!({ "mastered": 2 })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_invalidation_advances_epoch() {
        let cache = ResponseCache::new();
        let start = cache.epoch();
        cache.invalidate(&key("/missing"));
        cache.invalidate_prefix("/missing");
        cache.invalidate_all();
        assert_eq!(cache.epoch(), start + 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let cache = ResponseCache::new();
        cache.put(key("/short"), json!(1), Duration::from_secs(1));
        cache.put(key("/long"), json!(2), Duration::from_secs(600));
        tokio::time::advance(Duration::from_secs(2)).await;

        let stats = cache.stats();
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.valid_entries, 1);

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("/long")).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_capacity_eviction() {
        let config = CacheConfig {
            max_entries: 2,
            ..CacheConfig::default()
        };
        let cache = ResponseCache::with_config(config);
        cache.put(key("/a"), json!(1), TTL);
        tokio::time::advance(Duration::from_millis(10)).await;
        cache.put(key("/b"), json!(2), TTL);
        tokio::time::advance(Duration::from_millis(10)).await;
        cache.put(key("/c"), json!(3), TTL);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("/a")).is_none());
        assert!(cache.get(&key("/c")).is_some());
    }
}
