//! API Handlers
//!
//! One module per catalog resource. Reads return projections of catalog
//! documents; writes validate, commit through `AppState::commit_write` and
//! return the stored document.

pub mod albums;
pub mod artists;
pub mod playlists;
pub mod search;
pub mod system;
pub mod tracks;

pub use system::{health_handler, stats_handler};
