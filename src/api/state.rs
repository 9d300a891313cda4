//! Application state shared across all handlers.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::cache::{CacheClient, CacheStore, InvalidationCoordinator, Mutation};
use crate::catalog::{
    BlobStore, CatalogStore, InMemoryCatalog, ResourceKind, SigningBlobStore, WriteOp,
};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::Validate;

/// Dependencies injected into every handler and cache middleware.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheClient,
    pub invalidator: InvalidationCoordinator,
    pub catalog: Arc<dyn CatalogStore>,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    pub fn new(
        cache: CacheClient,
        catalog: Arc<dyn CatalogStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            invalidator: InvalidationCoordinator::new(cache.clone()),
            cache,
            catalog,
            blobs,
        }
    }

    /// State over `store` with an empty in-memory catalog and the configured
    /// URL signer.
    pub fn from_config(config: &Config, store: Arc<dyn CacheStore>) -> Self {
        let cache = CacheClient::new(store, config.default_ttl);
        let blobs = SigningBlobStore::new(
            &config.blob_base_url,
            &config.blob_signing_secret,
            config.signed_url_ttl,
        );
        Self::new(cache, Arc::new(InMemoryCatalog::new()), Arc::new(blobs))
    }

    /// Applies a catalog write, then invalidates the cache.
    ///
    /// Every write handler goes through here. Invalidation only runs once the
    /// write has returned `Ok`, so a rejected or failed write never flushes.
    pub async fn commit_write(&self, kind: ResourceKind, op: WriteOp) -> Result<Value> {
        let operation = op.operation();
        let document = self.catalog.execute_write(kind, op).await?;
        self.invalidator
            .invalidate(Mutation::new(kind, operation))
            .await;
        Ok(document)
    }

    /// Fetches a document or fails with `NotFound`.
    pub async fn require(&self, kind: ResourceKind, id: &str) -> Result<Value> {
        self.catalog
            .find_by_id(kind, id)
            .await?
            .ok_or_else(|| kind.not_found())
    }
}

/// Body for a committed write: its projection, or the stored document when
/// the projection's lookups fail. The write and its invalidation have already
/// happened at this point.
pub fn committed_view(kind: ResourceKind, view: Result<Value>, committed: Value) -> Value {
    view.unwrap_or_else(|e| {
        warn!(collection = %kind, error = %e, "projection failed after commit, returning stored document");
        committed
    })
}

/// Decodes and validates a JSON request body.
pub fn parse_payload<T>(body: Value) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let payload: T =
        serde_json::from_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    match payload.validate() {
        Some(message) => Err(ApiError::InvalidRequest(message)),
        None => Ok(payload),
    }
}

/// Serializes a payload into the document stored in the catalog.
pub fn to_document<T: Serialize>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload).map_err(|e| ApiError::Internal(e.to_string()))
}
