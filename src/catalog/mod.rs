//! Catalog Module
//!
//! The document-store boundary behind the cache: typed read queries and
//! write operations over JSON documents, an in-memory implementation, media
//! URL signing and the projections handlers return.

mod blob;
mod memory;
pub mod projection;
mod query;
mod store;

use std::fmt;

pub use blob::{BlobStore, SigningBlobStore};
pub use memory::InMemoryCatalog;
pub use query::{Filter, Page, ReadQuery, SortSpec, WriteOp};
pub use store::CatalogStore;

// == Resource Kind ==
/// Catalog collections whose writes invalidate the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Artist,
    Album,
    Track,
    Playlist,
}

impl ResourceKind {
    /// Human label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Artist => "Artist",
            ResourceKind::Album => "Album",
            ResourceKind::Track => "Track",
            ResourceKind::Playlist => "Playlist",
        }
    }

    /// Collection name in the document store.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Artist => "artists",
            ResourceKind::Album => "albums",
            ResourceKind::Track => "tracks",
            ResourceKind::Playlist => "playlists",
        }
    }

    /// Field whose value no two documents of the collection may share.
    pub fn unique_field(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Artist => Some("name"),
            _ => None,
        }
    }

    pub fn not_found(&self) -> crate::error::ApiError {
        crate::error::ApiError::NotFound(format!("{} not found", self.label()))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}
