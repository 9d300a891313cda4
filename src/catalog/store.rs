use async_trait::async_trait;
use serde_json::Value;

use super::{Page, ReadQuery, ResourceKind, WriteOp};
use crate::error::Result;

/// Document store holding the catalog.
///
/// Writes return once they are durable and visible to subsequent reads;
/// cache invalidation relies on that ordering.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Runs a filtered, sorted and windowed read over one collection.
    async fn execute_read(&self, kind: ResourceKind, query: &ReadQuery) -> Result<Page>;

    /// Fetches one document by id.
    async fn find_by_id(&self, kind: ResourceKind, id: &str) -> Result<Option<Value>>;

    /// Applies a write and returns the resulting document (the removed one
    /// for a delete). Fails with `NotFound` for unknown ids.
    async fn execute_write(&self, kind: ResourceKind, op: WriteOp) -> Result<Value>;
}
