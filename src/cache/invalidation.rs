//! Invalidation Coordinator
//!
//! Every committed catalog write calls `invalidate`. Cached reads are keyed by
//! opaque strings with no index from entity to key, and artist, album, track
//! and playlist reads embed each other, so the coordinator empties the whole
//! store rather than trying to pick out the affected keys.

use std::fmt;

use tracing::{info, warn};

use super::CacheClient;
use crate::catalog::ResourceKind;

/// Kind of committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteOperation::Create => "create",
            WriteOperation::Update => "update",
            WriteOperation::Delete => "delete",
        })
    }
}

/// A write that has been durably committed to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub resource: ResourceKind,
    pub operation: WriteOperation,
}

impl Mutation {
    pub fn new(resource: ResourceKind, operation: WriteOperation) -> Self {
        Self {
            resource,
            operation,
        }
    }
}

// == Invalidation Coordinator ==
/// Single shared invalidation hook for every write path.
#[derive(Clone)]
pub struct InvalidationCoordinator {
    cache: CacheClient,
}

impl InvalidationCoordinator {
    pub fn new(cache: CacheClient) -> Self {
        Self { cache }
    }

    /// Purges cached reads after `mutation` committed.
    ///
    /// Must only be called once the write is visible in the catalog. A failed
    /// flush is logged and swallowed; stale entries then live until their TTL
    /// or the next successful flush.
    pub async fn invalidate(&self, mutation: Mutation) {
        if self.cache.flush_all().await {
            info!(
                resource = %mutation.resource,
                operation = %mutation.operation,
                "cache flushed after catalog write"
            );
        } else {
            warn!(
                resource = %mutation.resource,
                operation = %mutation.operation,
                "cache flush failed after catalog write, stale reads possible until TTL expiry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cache::MemoryStore;

    async fn populated() -> (InvalidationCoordinator, CacheClient, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(100));
        let cache = CacheClient::new(store.clone(), 300);
        cache.set("albums-list:{}", "[]".to_string(), None).await;
        cache.set("artist-detail:{}", "{}".to_string(), None).await;
        (InvalidationCoordinator::new(cache.clone()), cache, store)
    }

    #[tokio::test]
    async fn test_any_mutation_empties_cache() {
        let kinds = [
            ResourceKind::Artist,
            ResourceKind::Album,
            ResourceKind::Track,
            ResourceKind::Playlist,
        ];
        let ops = [
            WriteOperation::Create,
            WriteOperation::Update,
            WriteOperation::Delete,
        ];

        for kind in kinds {
            for op in ops {
                let (coordinator, cache, _) = populated().await;
                coordinator.invalidate(Mutation::new(kind, op)).await;
                assert_eq!(cache.len().await, Some(0), "{} {} left entries", kind, op);
            }
        }
    }

    #[tokio::test]
    async fn test_repeated_invalidation_is_harmless() {
        let (coordinator, cache, _) = populated().await;
        let mutation = Mutation::new(ResourceKind::Track, WriteOperation::Update);

        coordinator.invalidate(mutation).await;
        coordinator.invalidate(mutation).await;

        assert_eq!(cache.len().await, Some(0));
        assert_eq!(cache.stats().flushes, 2);
    }

    #[tokio::test]
    async fn test_failed_flush_is_swallowed() {
        let (coordinator, cache, store) = populated().await;
        store.set_connected(false);

        coordinator
            .invalidate(Mutation::new(ResourceKind::Album, WriteOperation::Create))
            .await;

        assert_eq!(cache.stats().flushes, 0);
        assert_eq!(cache.stats().errors, 1);
    }
}
