//! Cache Client Module
//!
//! The degrading front door to a `CacheStore`: store failures are logged and
//! turned into misses or no-ops so the cache can never fail a request.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::stats::{CacheStats, StatsSnapshot};
use crate::cache::store::CacheStore;
use crate::error::CacheError;

// == Cache Client ==
/// Shared handle on the configured cache store.
///
/// Cloning is cheap; every clone sees the same store and counters.
#[derive(Clone)]
pub struct CacheClient {
    store: Arc<dyn CacheStore>,
    default_ttl: u64,
    stats: Arc<CacheStats>,
}

impl CacheClient {
    /// Wraps `store`, using `default_ttl` seconds when callers omit a TTL.
    pub fn new(store: Arc<dyn CacheStore>, default_ttl: u64) -> Self {
        Self {
            store,
            default_ttl: default_ttl.max(1),
            stats: Arc::new(CacheStats::new()),
        }
    }

    fn degrade(&self, op: &'static str, key: Option<&str>, err: &CacheError) {
        self.stats.record_error();
        match key {
            Some(key) => warn!(
                backend = self.store.backend_name(),
                op,
                key = %key,
                error = %err,
                "cache operation failed, continuing without cache"
            ),
            None => warn!(
                backend = self.store.backend_name(),
                op,
                error = %err,
                "cache operation failed, continuing without cache"
            ),
        }
    }

    // == Lifecycle ==
    /// Connects the underlying store. A failure is logged and the service
    /// keeps running uncached.
    pub async fn connect(&self) -> bool {
        match self.store.connect().await {
            Ok(()) => true,
            Err(e) => {
                self.degrade("connect", None, &e);
                false
            }
        }
    }

    /// Disconnects the underlying store.
    pub async fn disconnect(&self) {
        if let Err(e) = self.store.disconnect().await {
            self.degrade("disconnect", None, &e);
        }
    }

    // == Get ==
    /// Returns the cached payload, or `None` on a miss or a store failure.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(Some(value)) => {
                self.stats.record_hit();
                debug!(key = %key, outcome = "hit", "cache lookup");
                Some(value)
            }
            Ok(None) => {
                self.stats.record_miss();
                debug!(key = %key, outcome = "miss", "cache lookup");
                None
            }
            Err(e) => {
                self.stats.record_miss();
                self.degrade("get", Some(key), &e);
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` for `ttl` seconds (the default TTL when `None`).
    ///
    /// Returns whether the value was stored.
    pub async fn set(&self, key: &str, value: String, ttl: Option<u64>) -> bool {
        let ttl = ttl.filter(|t| *t > 0).unwrap_or(self.default_ttl);
        match self.store.set(key, value, ttl).await {
            Ok(()) => {
                self.stats.record_set();
                debug!(key = %key, ttl, "cache populated");
                true
            }
            Err(e) => {
                self.degrade("set", Some(key), &e);
                false
            }
        }
    }

    // == Delete ==
    /// Removes one key. Returns whether the store acknowledged it.
    pub async fn delete(&self, key: &str) -> bool {
        match self.store.delete(key).await {
            Ok(()) => true,
            Err(e) => {
                self.degrade("delete", Some(key), &e);
                false
            }
        }
    }

    // == Flush All ==
    /// Empties the store. Returns whether the store acknowledged it.
    pub async fn flush_all(&self) -> bool {
        match self.store.flush_all().await {
            Ok(()) => {
                self.stats.record_flush();
                true
            }
            Err(e) => {
                self.degrade("flush_all", None, &e);
                false
            }
        }
    }

    /// Number of stored keys, `None` if the store cannot be reached.
    pub async fn len(&self) -> Option<usize> {
        match self.store.len().await {
            Ok(len) => Some(len),
            Err(e) => {
                self.degrade("len", None, &e);
                None
            }
        }
    }

    /// Whether the store currently answers.
    pub async fn is_available(&self) -> bool {
        self.store.ping().await.is_ok()
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    fn client_with_store() -> (CacheClient, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(100));
        (CacheClient::new(store.clone(), 300), store)
    }

    #[tokio::test]
    async fn test_get_set_roundtrip_counts_hits_and_misses() {
        let (client, _) = client_with_store();

        assert_eq!(client.get("k").await, None);
        assert!(client.set("k", "v".to_string(), None).await);
        assert_eq!(client.get("k").await, Some("v".to_string()));

        let stats = client.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
    }

    #[tokio::test]
    async fn test_flush_all_empties_and_is_repeatable() {
        let (client, _) = client_with_store();
        client.set("a", "1".to_string(), Some(60)).await;
        client.set("b", "2".to_string(), Some(60)).await;

        assert!(client.flush_all().await);
        assert!(client.flush_all().await);

        assert_eq!(client.len().await, Some(0));
        assert_eq!(client.get("a").await, None);
        assert_eq!(client.stats().flushes, 2);
    }

    #[tokio::test]
    async fn test_unreachable_store_degrades_to_noop() {
        let (client, store) = client_with_store();
        client.set("k", "v".to_string(), None).await;
        store.set_connected(false);

        assert_eq!(client.get("k").await, None);
        assert!(!client.set("k2", "v".to_string(), None).await);
        assert!(!client.delete("k").await);
        assert!(!client.flush_all().await);
        assert_eq!(client.len().await, None);
        assert!(!client.is_available().await);
        assert_eq!(client.stats().errors, 5);
    }

    #[tokio::test]
    async fn test_zero_ttl_uses_default() {
        let (client, _) = client_with_store();
        assert!(client.set("k", "v".to_string(), Some(0)).await);
        assert_eq!(client.get("k").await, Some("v".to_string()));
        assert_eq!(client.default_ttl(), 300);
    }
}
