//! Response DTOs for the catalog API
//!
//! Every successful body carries `success: true`; errors are rendered by
//! `ApiError`.

use serde::Serialize;

use crate::cache::StatsSnapshot;

/// `{success, data}` or `{success, message}`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

// == Pagination ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub items_per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            current_page: page,
            items_per_page: limit,
            total_items: total,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }
}

// == Operational ==
#[derive(Debug, Clone, Serialize)]
pub struct CacheHealth {
    pub backend: &'static str,
    pub available: bool,
}

/// Body of `GET /health`. The service stays up without its cache, so an
/// unreachable store reports `degraded` rather than failing.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub cache: CacheHealth,
}

impl HealthResponse {
    pub fn new(backend: &'static str, available: bool) -> Self {
        Self {
            status: if available { "healthy" } else { "degraded" }.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache: CacheHealth { backend, available },
        }
    }
}

/// Body of `GET /cache/stats`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub backend: &'static str,
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub flushes: u64,
    pub errors: u64,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    /// `None` when the store cannot be reached
    pub total_entries: Option<usize>,
}

impl StatsResponse {
    pub fn new(backend: &'static str, stats: StatsSnapshot, total_entries: Option<usize>) -> Self {
        Self {
            backend,
            hits: stats.hits,
            misses: stats.misses,
            sets: stats.sets,
            flushes: stats.flushes,
            errors: stats.errors,
            hit_rate: stats.hit_rate(),
            total_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(2, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
        assert!(p.has_previous_page);

        let last = Pagination::new(3, 10, 25);
        assert!(!last.has_next_page);

        let empty = Pagination::new(1, 10, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
        assert!(!empty.has_previous_page);
    }

    #[test]
    fn test_paginated_response_wire_shape() {
        let body = PaginatedResponse::new(vec![json!({"id": "a"})], Pagination::new(1, 10, 1));
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["pagination"]["itemsPerPage"], 10);
        assert_eq!(value["pagination"]["hasNextPage"], false);
    }

    #[test]
    fn test_message_response_omits_data() {
        let value = serde_json::to_value(ApiResponse::message("Album deleted")).unwrap();
        assert_eq!(value, json!({"success": true, "message": "Album deleted"}));
    }

    #[test]
    fn test_health_reports_degraded_cache() {
        let value = serde_json::to_value(HealthResponse::new("redis", false)).unwrap();
        assert_eq!(value["status"], "degraded");
        assert_eq!(value["cache"]["available"], false);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let snapshot = StatsSnapshot {
            hits: 80,
            misses: 20,
            sets: 20,
            flushes: 1,
            errors: 0,
        };
        let resp = StatsResponse::new("memory", snapshot, Some(20));
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.total_entries, Some(20));
    }
}
