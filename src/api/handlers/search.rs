//! Cross-collection search

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::api::params::TOP_N;
use crate::api::state::AppState;
use crate::catalog::projection::{album_view, artist_view, track_views};
use crate::catalog::{Filter, ReadQuery, ResourceKind};
use crate::error::Result;
use crate::models::ApiResponse;

/// GET /api/search/:value
///
/// Case-insensitive title/name match, at most ten hits per collection.
pub async fn global_search(
    State(state): State<AppState>,
    Path(value): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    let catalog = state.catalog.as_ref();
    let blobs = state.blobs.as_ref();
    let read = |field: &str| {
        ReadQuery::new()
            .filter(Filter::text(&[field], &value))
            .limit(TOP_N)
    };

    let tracks = catalog.execute_read(ResourceKind::Track, &read("title")).await?.items;
    let artists = catalog.execute_read(ResourceKind::Artist, &read("name")).await?.items;
    let albums = catalog.execute_read(ResourceKind::Album, &read("title")).await?.items;

    let tracks = track_views(catalog, blobs, &tracks).await?;
    let artist_views: Vec<Value> = artists.iter().map(|a| artist_view(blobs, a)).collect();
    let mut album_views = Vec::with_capacity(albums.len());
    for album in &albums {
        album_views.push(album_view(catalog, blobs, album).await?);
    }

    Ok(Json(ApiResponse::ok(json!({
        "tracks": tracks,
        "artists": artist_views,
        "albums": album_views,
    }))))
}
