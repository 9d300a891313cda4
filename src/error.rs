//! Error types for the catalog service
//!
//! `ApiError` is what handlers return and what clients see. `CacheError` is
//! internal to the cache layer and never reaches a response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == API Error Enum ==
/// Unified error type for request handlers and the catalog store.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Payload or query failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Write conflicts with the current state of the entity
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Document store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

// == Cache Error Enum ==
/// Failures reported by a cache store.
///
/// Callers go through `CacheClient`, which logs these and degrades to a miss
/// or a no-op.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Store is disconnected or unreachable
    #[error("cache store unavailable: {0}")]
    Unavailable(String),

    /// Store answered with an error
    #[error("cache backend error: {0}")]
    Backend(String),

    /// Value could not be encoded for storage
    #[error("cache serialization error: {0}")]
    Serialization(String),

    /// Key or value rejected by the store's limits
    #[error("cache entry rejected: {0}")]
    InvalidEntry(String),
}

// == Result Type Alias ==
/// Convenience Result type for handlers and catalog operations.
pub type Result<T> = std::result::Result<T, ApiError>;
