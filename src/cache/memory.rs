//! In-Memory Store Module
//!
//! HashMap storage with LRU capacity eviction and TTL expiration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::entry::{current_timestamp_ms, CacheEntry};
use crate::cache::lru::LruTracker;
use crate::cache::store::{CacheStore, StoreResult};
use crate::cache::{MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::CacheError;

// == Store Internals ==
#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, CacheEntry>,
    lru: LruTracker,
    evictions: u64,
}

impl Entries {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        self.lru.remove(key);
        self.map.remove(key)
    }
}

// == Memory Store ==
/// Process-local cache store.
///
/// Starts connected. `disconnect()` makes every operation fail with
/// `CacheError::Unavailable`, the same way an unreachable Redis would.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<Entries>,
    connected: AtomicBool,
    max_entries: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` keys.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            connected: AtomicBool::new(true),
            max_entries: max_entries.max(1),
        }
    }

    fn ensure_connected(&self) -> StoreResult<()> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(CacheError::Unavailable("memory store is disconnected".to_string()))
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;

        let expired: Vec<String> = entries
            .map
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.remove(key);
        }

        expired.len()
    }

    /// Total entries evicted for capacity since creation.
    pub async fn evictions(&self) -> u64 {
        self.entries.read().await.evictions
    }

    /// Toggles reachability without touching stored data.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.ensure_connected()?;

        // Write lock: an expired hit is removed and a live hit updates recency.
        let mut entries = self.entries.write().await;
        let expired = match entries.map.get(key) {
            None => return Ok(None),
            Some(entry) => entry.is_expired(),
        };

        if expired {
            entries.remove(key);
            return Ok(None);
        }

        entries.lru.touch(key);
        Ok(entries.map.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> StoreResult<()> {
        self.ensure_connected()?;

        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidEntry(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidEntry(format!(
                "value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        let mut entries = self.entries.write().await;

        if !entries.map.contains_key(key) && entries.map.len() >= self.max_entries {
            if let Some(evicted) = entries.lru.evict_oldest() {
                entries.map.remove(&evicted);
                entries.evictions += 1;
            }
        }

        entries
            .map
            .insert(key.to_string(), CacheEntry::new(value, ttl_secs));
        entries.lru.touch(key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.ensure_connected()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn flush_all(&self) -> StoreResult<()> {
        self.ensure_connected()?;
        let mut entries = self.entries.write().await;
        entries.map.clear();
        entries.lru.clear();
        Ok(())
    }

    async fn len(&self) -> StoreResult<usize> {
        self.ensure_connected()?;
        Ok(self.entries.read().await.map.len())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.ensure_connected()
    }

    async fn connect(&self) -> StoreResult<()> {
        self.set_connected(true);
        Ok(())
    }

    async fn disconnect(&self) -> StoreResult<()> {
        self.set_connected(false);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_store_set_and_get() {
        let store = MemoryStore::new(100);

        store.set("k1", "v1".to_string(), 300).await.unwrap();

        assert_eq!(store.get("k1").await.unwrap(), Some("v1".to_string()));
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_get_missing_is_none() {
        let store = MemoryStore::new(100);
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_overwrite() {
        let store = MemoryStore::new(100);

        store.set("k1", "v1".to_string(), 300).await.unwrap();
        store.set("k1", "v2".to_string(), 300).await.unwrap();

        assert_eq!(store.get("k1").await.unwrap(), Some("v2".to_string()));
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_delete_is_idempotent() {
        let store = MemoryStore::new(100);

        store.set("k1", "v1".to_string(), 300).await.unwrap();
        store.delete("k1").await.unwrap();
        store.delete("k1").await.unwrap();
        store.delete("never-set").await.unwrap();

        assert_eq!(store.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_ttl_expiration() {
        let store = MemoryStore::new(100);

        store.set("short", "v".to_string(), 1).await.unwrap();
        assert!(store.get("short").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_flush_all_is_idempotent() {
        let store = MemoryStore::new(100);
        for i in 0..5 {
            store.set(&format!("k{}", i), "v".to_string(), 300).await.unwrap();
        }

        store.flush_all().await.unwrap();
        store.flush_all().await.unwrap();
        store.flush_all().await.unwrap();

        assert_eq!(store.len().await.unwrap(), 0);
        assert_eq!(store.get("k3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_lru_eviction() {
        let store = MemoryStore::new(3);

        store.set("k1", "v".to_string(), 300).await.unwrap();
        store.set("k2", "v".to_string(), 300).await.unwrap();
        store.set("k3", "v".to_string(), 300).await.unwrap();

        // k1 becomes most recent, so k2 is evicted next
        store.get("k1").await.unwrap();
        store.set("k4", "v".to_string(), 300).await.unwrap();

        assert_eq!(store.len().await.unwrap(), 3);
        assert!(store.get("k1").await.unwrap().is_some());
        assert_eq!(store.get("k2").await.unwrap(), None);
        assert_eq!(store.evictions().await, 1);
    }

    #[tokio::test]
    async fn test_store_cleanup_expired() {
        let store = MemoryStore::new(100);

        store.set("short", "v".to_string(), 1).await.unwrap();
        store.set("long", "v".to_string(), 60).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.cleanup_expired().await, 1);
        assert_eq!(store.len().await.unwrap(), 1);
        assert!(store.get("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_store_rejects_oversized_entries() {
        let store = MemoryStore::new(100);

        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);
        let result = store.set(&long_key, "v".to_string(), 60).await;
        assert!(matches!(result, Err(CacheError::InvalidEntry(_))));

        let large_value = "x".repeat(MAX_VALUE_SIZE + 1);
        let result = store.set("k", large_value, 60).await;
        assert!(matches!(result, Err(CacheError::InvalidEntry(_))));
    }

    #[tokio::test]
    async fn test_disconnected_store_is_unavailable() {
        let store = MemoryStore::new(100);
        store.set("k", "v".to_string(), 60).await.unwrap();

        store.disconnect().await.unwrap();
        assert!(matches!(store.get("k").await, Err(CacheError::Unavailable(_))));
        assert!(matches!(store.flush_all().await, Err(CacheError::Unavailable(_))));
        assert!(store.ping().await.is_err());

        // Data survives a reconnect
        store.connect().await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }
}
