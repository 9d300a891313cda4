//! Read-through response cache middleware.
//!
//! Wraps a read handler: a GET whose key is already cached is answered from
//! the store without running the handler; a miss runs the handler and stores
//! its body when the status is 2xx.

use std::collections::BTreeMap;

use axum::{
    body::Body,
    extract::{Query, RawPathParams, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::de::IgnoredAny;
use tracing::{debug, warn};

use super::{generate_key, CacheClient, KeyParams};

// == Route Policy ==
/// Per-route cache settings: key prefix and entry lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePolicy {
    pub prefix: &'static str,
    /// Lifetime in seconds; `None` uses the client's default TTL
    pub ttl: Option<u64>,
}

impl RoutePolicy {
    pub const fn new(prefix: &'static str, ttl: u64) -> Self {
        Self {
            prefix,
            ttl: Some(ttl),
        }
    }

    /// Policy using the client's default TTL.
    pub const fn with_default_ttl(prefix: &'static str) -> Self {
        Self { prefix, ttl: None }
    }
}

/// State handed to `read_through` for one mounted route.
#[derive(Clone)]
pub struct ReadThrough {
    pub cache: CacheClient,
    pub policy: RoutePolicy,
}

impl ReadThrough {
    pub fn new(cache: CacheClient, policy: RoutePolicy) -> Self {
        Self { cache, policy }
    }
}

// == Middleware ==
/// Read-through cache layer; mount with `axum::middleware::from_fn_with_state`.
pub async fn read_through(
    State(state): State<ReadThrough>,
    path_params: Option<RawPathParams>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = request_key(state.policy.prefix, &request, path_params.as_ref());

    if let Some(cached) = state.cache.get(&key).await {
        debug!(key = %key, "serving cached response");
        return cached_response(cached);
    }

    let response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }
    if !declares_json(&response) {
        debug!(key = %key, "response is not JSON, passing through uncached");
        return response;
    }

    let (parts, body) = response.into_parts();
    // JSON responses are built in memory, so buffering them cannot fail
    // short of a handler streaming a body under a JSON content type.
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(key = %key, error = %e, "failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match cacheable_payload(&bytes) {
        Some(payload) => {
            state.cache.set(&key, payload, state.policy.ttl).await;
        }
        None => {
            warn!(key = %key, "response body is not JSON, skipping cache population");
        }
    }

    Response::from_parts(parts, Body::from(bytes))
}

/// Derives the cache key from the route prefix, query string and path params.
pub fn request_key(prefix: &str, request: &Request, path_params: Option<&RawPathParams>) -> String {
    let query = match Query::<BTreeMap<String, String>>::try_from_uri(request.uri()) {
        Ok(Query(map)) => map,
        Err(_) => {
            // Unparseable query strings still get a distinct key
            let mut raw = BTreeMap::new();
            if let Some(q) = request.uri().query() {
                raw.insert(String::new(), q.to_string());
            }
            raw
        }
    };

    let params = path_params
        .map(|p| {
            p.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default();

    generate_key(prefix, &KeyParams::new(query, params))
}

fn declares_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("application/json"))
}

fn cacheable_payload(bytes: &[u8]) -> Option<String> {
    serde_json::from_slice::<IgnoredAny>(bytes).ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

fn cached_response(payload: String) -> Response {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        payload,
    )
        .into_response()
}
