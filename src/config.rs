//! Configuration Module
//!
//! Loads service configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Which cache store the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    /// In-process store, suitable for a single instance and for tests
    Memory,
    /// Shared Redis instance reachable by every worker
    Redis,
}

impl FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "local" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache store implementation
    pub cache_backend: CacheBackendKind,
    /// Redis connection URL (redis backend only)
    pub redis_url: String,
    /// Maximum pooled Redis connections
    pub redis_pool_size: usize,
    /// Pool wait/create/recycle timeout in milliseconds
    pub redis_timeout_ms: u64,
    /// TTL in seconds applied when a caller does not give one
    pub default_ttl: u64,
    /// Capacity of the in-memory store before LRU eviction
    pub max_entries: usize,
    /// Expiry sweep interval in seconds (memory backend only)
    pub cleanup_interval: u64,
    /// Base URL media references are resolved against
    pub blob_base_url: String,
    /// Secret used to sign media URLs
    pub blob_signing_secret: String,
    /// Lifetime of a signed media URL in seconds
    pub signed_url_ttl: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_BACKEND` - `memory` or `redis` (default: memory)
    /// - `REDIS_URL` - Redis URL (default: redis://127.0.0.1:6379)
    /// - `REDIS_POOL_SIZE` - Pool size (default: 16)
    /// - `REDIS_TIMEOUT_MS` - Pool timeouts (default: 500)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `MAX_ENTRIES` - In-memory capacity (default: 10000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    /// - `BLOB_BASE_URL` - Media base URL (default: https://media.local)
    /// - `BLOB_SIGNING_SECRET` - Media signing secret (default: dev-secret)
    /// - `SIGNED_URL_TTL` - Signed URL lifetime in seconds (default: 3600)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cache_backend: parse_var("CACHE_BACKEND").unwrap_or(defaults.cache_backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            redis_pool_size: parse_var("REDIS_POOL_SIZE").unwrap_or(defaults.redis_pool_size),
            redis_timeout_ms: parse_var("REDIS_TIMEOUT_MS").unwrap_or(defaults.redis_timeout_ms),
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            blob_base_url: env::var("BLOB_BASE_URL").unwrap_or(defaults.blob_base_url),
            blob_signing_secret: env::var("BLOB_SIGNING_SECRET")
                .unwrap_or(defaults.blob_signing_secret),
            signed_url_ttl: parse_var("SIGNED_URL_TTL").unwrap_or(defaults.signed_url_ttl),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_backend: CacheBackendKind::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            redis_pool_size: 16,
            redis_timeout_ms: 500,
            default_ttl: 3600,
            max_entries: 10_000,
            cleanup_interval: 1,
            blob_base_url: "https://media.local".to_string(),
            blob_signing_secret: "dev-secret".to_string(),
            signed_url_ttl: 3600,
        }
    }
}
