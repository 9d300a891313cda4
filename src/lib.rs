//! Music Catalog - REST backend for artists, albums, tracks and playlists
//!
//! Catalog reads go through a read-through response cache (in-memory or
//! Redis) that is flushed after every committed write.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::{CacheBackendKind, Config};
pub use tasks::spawn_cleanup_task;
