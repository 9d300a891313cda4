//! Query-string parsing shared by the list and search handlers.

use std::collections::HashMap;

use crate::catalog::SortSpec;
use crate::error::{ApiError, Result};
use crate::models::Pagination;

pub type QueryMap = HashMap<String, String>;

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 50;

/// Size of the popular, recent, top and search listings.
pub const TOP_N: usize = 10;

// == Paging ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Reads `page` and `limit`. Missing, malformed or non-positive values
    /// fall back to the defaults; `limit` is capped.
    pub fn from_query(query: &QueryMap) -> Self {
        let positive = |name: &str| {
            query
                .get(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v >= 1)
        };
        Self {
            page: positive("page").unwrap_or(DEFAULT_PAGE),
            limit: positive("limit").unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        }
    }

    /// Documents before this page. Saturates for absurdly large pages, which
    /// then simply come back empty.
    pub fn skip(&self) -> usize {
        let offset = self.page.saturating_sub(1).saturating_mul(self.limit);
        usize::try_from(offset).unwrap_or(usize::MAX)
    }

    pub fn limit(&self) -> usize {
        self.limit as usize
    }

    pub fn pagination(&self, total: u64) -> Pagination {
        Pagination::new(self.page, self.limit, total)
    }
}

// == Sorting ==
/// `sortBy` restricted to `allowed` (default `createdAt`), `order` asc or
/// desc (default desc).
pub fn sort_from_query(query: &QueryMap, allowed: &[&str]) -> SortSpec {
    let field = query
        .get("sortBy")
        .map(String::as_str)
        .filter(|f| allowed.contains(f))
        .unwrap_or("createdAt");
    match query.get("order").map(|o| o.to_ascii_lowercase()) {
        Some(order) if order == "asc" => SortSpec::asc(field),
        _ => SortSpec::desc(field),
    }
}

// == Values ==
/// Non-blank string parameter.
pub fn text_param<'a>(query: &'a QueryMap, name: &str) -> Option<&'a str> {
    query
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Integer parameter; present but malformed is a 400.
pub fn int_param(query: &QueryMap, name: &str) -> Result<Option<i64>> {
    match text_param(query, name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::InvalidRequest(format!("{} must be an integer", name))),
    }
}

/// The mandatory `query` parameter of the search endpoints.
pub fn search_term(query: &QueryMap) -> Result<&str> {
    text_param(query, "query")
        .ok_or_else(|| ApiError::InvalidRequest("query parameter is required".to_string()))
}
