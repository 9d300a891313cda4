//! Cache Module
//!
//! Read-through caching for catalog reads: the store contract and its
//! backends, key derivation, the response middleware and write-triggered
//! invalidation.

mod client;
mod entry;
mod invalidation;
mod keys;
mod lru;
mod memory;
mod middleware;
mod redis_store;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use client::CacheClient;
pub use entry::CacheEntry;
pub use invalidation::{InvalidationCoordinator, Mutation, WriteOperation};
pub use keys::{generate_key, KeyParams};
pub use memory::MemoryStore;
pub use middleware::{read_through, request_key, ReadThrough, RoutePolicy};
pub use redis_store::RedisStore;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{CacheStore, StoreResult};

// == Public Constants ==
/// Maximum key length accepted by the in-memory store, in bytes
pub const MAX_KEY_LENGTH: usize = 4096;

/// Maximum value size accepted by the in-memory store, in bytes
pub const MAX_VALUE_SIZE: usize = 4 * 1024 * 1024; // 4 MB
