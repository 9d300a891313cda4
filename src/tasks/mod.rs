//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: sweeps expired entries from the in-memory cache store

mod cleanup;

pub use cleanup::spawn_cleanup_task;
