//! In-Memory Catalog
//!
//! Process-local document store used by the binary and the tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{CatalogStore, Page, ReadQuery, ResourceKind, WriteOp};
use crate::error::{ApiError, Result};

/// Fields owned by the store; patches cannot overwrite them.
const RESERVED_FIELDS: [&str; 2] = ["id", "createdAt"];

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn as_object(value: Value, what: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::InvalidRequest(format!("{} must be a JSON object", what))),
    }
}

fn unique_value<'a>(doc: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str).map(str::trim)
}

/// `Conflict` when a document other than `except` already holds the unique
/// field value carried by `fields`. Runs under the collection write lock.
fn ensure_unique(
    kind: ResourceKind,
    docs: &BTreeMap<String, Value>,
    fields: &Map<String, Value>,
    except: Option<&str>,
) -> Result<()> {
    let Some(field) = kind.unique_field() else {
        return Ok(());
    };
    let Some(value) = unique_value(fields, field) else {
        return Ok(());
    };

    let taken = docs.iter().any(|(id, doc)| {
        Some(id.as_str()) != except
            && doc
                .as_object()
                .and_then(|doc| unique_value(doc, field))
                .is_some_and(|existing| existing == value)
    });
    if taken {
        return Err(ApiError::Conflict(format!(
            "{} with {} '{}' already exists",
            kind.label(),
            field,
            value
        )));
    }
    Ok(())
}

// == In-Memory Catalog ==
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    collections: RwLock<HashMap<ResourceKind, BTreeMap<String, Value>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in one collection.
    pub async fn count(&self, kind: ResourceKind) -> usize {
        self.collections
            .read()
            .await
            .get(&kind)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn execute_read(&self, kind: ResourceKind, query: &ReadQuery) -> Result<Page> {
        let collections = self.collections.read().await;
        let mut matched: Vec<&Value> = collections
            .get(&kind)
            .map(|docs| docs.values().filter(|doc| query.matches(doc)).collect())
            .unwrap_or_default();

        if let Some(sort) = &query.sort {
            // Stable sort keeps id order among ties.
            matched.sort_by(|a, b| sort.compare(a, b));
        }

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(query.skip)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(Page { items, total })
    }

    async fn find_by_id(&self, kind: ResourceKind, id: &str) -> Result<Option<Value>> {
        Ok(self
            .collections
            .read()
            .await
            .get(&kind)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn execute_write(&self, kind: ResourceKind, op: WriteOp) -> Result<Value> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(kind).or_default();

        match op {
            WriteOp::Create(payload) => {
                let mut doc = as_object(payload, "document")?;
                ensure_unique(kind, docs, &doc, None)?;
                let id = Uuid::new_v4().to_string();
                let now = timestamp();
                doc.insert("id".to_string(), Value::String(id.clone()));
                doc.insert("createdAt".to_string(), Value::String(now.clone()));
                doc.insert("updatedAt".to_string(), Value::String(now));

                let doc = Value::Object(doc);
                docs.insert(id.clone(), doc.clone());
                debug!(collection = %kind, id = %id, "document created");
                Ok(doc)
            }
            WriteOp::Update { id, patch } => {
                let patch = as_object(patch, "patch")?;
                if !docs.contains_key(&id) {
                    return Err(kind.not_found());
                }
                ensure_unique(kind, docs, &patch, Some(&id))?;
                let Some(Value::Object(doc)) = docs.get_mut(&id) else {
                    return Err(kind.not_found());
                };

                for (field, value) in patch {
                    if RESERVED_FIELDS.contains(&field.as_str()) {
                        continue;
                    }
                    if value.is_null() {
                        doc.remove(&field);
                    } else {
                        doc.insert(field, value);
                    }
                }
                doc.insert("updatedAt".to_string(), Value::String(timestamp()));
                debug!(collection = %kind, id = %id, "document updated");
                Ok(Value::Object(doc.clone()))
            }
            WriteOp::Delete { id } => {
                let removed = docs.remove(&id).ok_or_else(|| kind.not_found())?;
                debug!(collection = %kind, id = %id, "document deleted");
                Ok(removed)
            }
        }
    }
}
