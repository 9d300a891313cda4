//! Cache Store Module
//!
//! The key/value contract every cache backend implements.

use async_trait::async_trait;

use crate::error::CacheError;

/// Result type for raw store operations.
pub type StoreResult<T> = std::result::Result<T, CacheError>;

// == Cache Store Trait ==
/// Key/value storage with per-key expiration, shared by all request tasks.
///
/// Implementations report failures honestly; turning them into misses and
/// no-ops is `CacheClient`'s job.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the value under `key` if present and not expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value`, replacing any previous value, expiring after `ttl_secs`.
    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> StoreResult<()>;

    /// Removes `key`. Absent keys are not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Removes every key in the store.
    async fn flush_all(&self) -> StoreResult<()>;

    /// Number of keys currently held.
    async fn len(&self) -> StoreResult<usize>;

    /// Cheap reachability probe.
    async fn ping(&self) -> StoreResult<()>;

    /// Establishes the connection. Called once at service start.
    async fn connect(&self) -> StoreResult<()>;

    /// Releases the connection. Called once at shutdown.
    async fn disconnect(&self) -> StoreResult<()>;

    /// Short backend label for logs and the stats endpoint.
    fn backend_name(&self) -> &'static str;
}
