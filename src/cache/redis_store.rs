//! Redis Store Module
//!
//! Shared, process-external cache store backed by a deadpool Redis pool.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::{self, AsyncCommands};
use deadpool_redis::{Config as RedisConfig, Connection, Pool, Runtime};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::store::{CacheStore, StoreResult};
use crate::error::CacheError;

// == Redis Store ==
/// Cache store living in Redis so every worker process sees the same data.
///
/// The pool is created by `connect()` and dropped by `disconnect()`. While no
/// pool exists every call fails with `CacheError::Unavailable`.
pub struct RedisStore {
    url: String,
    pool_size: usize,
    timeout: Duration,
    pool: RwLock<Option<Pool>>,
}

impl RedisStore {
    /// Describes a store; no connection is made until `connect()`.
    pub fn new(url: impl Into<String>, pool_size: usize, timeout_ms: u64) -> Self {
        Self {
            url: url.into(),
            pool_size: pool_size.max(1),
            timeout: Duration::from_millis(timeout_ms),
            pool: RwLock::new(None),
        }
    }

    fn build_pool(&self) -> StoreResult<Pool> {
        let mut pool_config = deadpool_redis::PoolConfig::new(self.pool_size);
        pool_config.timeouts.wait = Some(self.timeout);
        pool_config.timeouts.create = Some(self.timeout);
        pool_config.timeouts.recycle = Some(self.timeout);

        let mut config = RedisConfig::from_url(&self.url);
        config.pool = Some(pool_config);

        config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::Unavailable(format!("failed to create redis pool: {}", e)))
    }

    async fn conn(&self) -> StoreResult<Connection> {
        let pool = self
            .pool
            .read()
            .await
            .clone()
            .ok_or_else(|| CacheError::Unavailable("redis store is not connected".to_string()))?;

        pool.get()
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))
    }
}

fn backend_error(e: redis::RedisError) -> CacheError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
    {
        CacheError::Unavailable(e.to_string())
    } else {
        CacheError::Backend(e.to_string())
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.get::<_, Option<String>>(key).await.map_err(backend_error)
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        // SET EX rejects a zero expiry
        conn.set_ex::<_, _, ()>(key, value, ttl_secs.max(1))
            .await
            .map_err(backend_error)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(key).await.map_err(backend_error)
    }

    async fn flush_all(&self) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;
        debug!("redis database flushed");
        Ok(())
    }

    async fn len(&self) -> StoreResult<usize> {
        let mut conn = self.conn().await?;
        let size: usize = redis::cmd("DBSIZE")
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;
        Ok(size)
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn connect(&self) -> StoreResult<()> {
        let pool = self.build_pool()?;
        *self.pool.write().await = Some(pool);

        // Probe once so startup logs say whether the cache is live
        self.ping().await?;
        info!(url = %self.url, "connected to redis");
        Ok(())
    }

    async fn disconnect(&self) -> StoreResult<()> {
        if let Some(pool) = self.pool.write().await.take() {
            pool.close();
            info!("redis pool closed");
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
