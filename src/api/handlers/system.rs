//! Operational endpoints; neither goes through the read-through cache.

use axum::{extract::State, Json};

use crate::api::state::AppState;
use crate::models::{HealthResponse, StatsResponse};

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let available = state.cache.is_available().await;
    Json(HealthResponse::new(state.cache.backend_name(), available))
}

/// GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let entries = state.cache.len().await;
    Json(StatsResponse::new(
        state.cache.backend_name(),
        state.cache.stats(),
        entries,
    ))
}
