//! API Module
//!
//! HTTP handlers, shared state and routing for the catalog REST API.

pub mod handlers;
pub mod params;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
