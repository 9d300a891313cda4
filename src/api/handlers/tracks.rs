//! Track handlers
//!
//! A track's `artistId` is never taken from the client: it is copied from
//! the album the track belongs to on create and whenever `albumId` changes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::api::params::{
    int_param, search_term, sort_from_query, text_param, PageRequest, QueryMap, TOP_N,
};
use crate::api::state::{committed_view, parse_payload, to_document, AppState};
use crate::catalog::projection::{track_view, track_views};
use crate::catalog::{Filter, ReadQuery, ResourceKind, SortSpec, WriteOp};
use crate::error::Result;
use crate::models::{ApiResponse, PaginatedResponse, PopularityUpdate, TrackPatch, TrackPayload};

const SORTABLE: [&str; 5] = ["title", "duration", "popularity", "trackNumber", "createdAt"];

fn range_filter(field: &str, min: Option<i64>, max: Option<i64>) -> Option<Filter> {
    (min.is_some() || max.is_some())
        .then(|| Filter::range(field, min.map(Value::from), max.map(Value::from)))
}

/// Document for a track on `album_id`, carrying the album's artist.
async fn with_album_artist(state: &AppState, mut document: Value, album_id: &str) -> Result<Value> {
    let album = state.require(ResourceKind::Album, album_id).await?;
    if let Value::Object(map) = &mut document {
        map.insert(
            "artistId".to_string(),
            album.get("artistId").cloned().unwrap_or(Value::Null),
        );
    }
    Ok(document)
}

// == Reads ==
/// GET /api/tracks
pub async fn list_tracks(
    State(state): State<AppState>,
    Query(query): Query<QueryMap>,
) -> Result<Json<PaginatedResponse<Value>>> {
    let page = PageRequest::from_query(&query);
    let mut read = ReadQuery::new()
        .sort(sort_from_query(&query, &SORTABLE))
        .window(page.skip(), page.limit());

    if let Some(artist_id) = text_param(&query, "artistId") {
        read = read.filter(Filter::eq("artistId", artist_id));
    }
    if let Some(album_id) = text_param(&query, "albumId") {
        read = read.filter(Filter::eq("albumId", album_id));
    }
    if let Some(genre) = text_param(&query, "genre") {
        read = read.filter(Filter::contains("genres", genre));
    }
    let duration = range_filter(
        "duration",
        int_param(&query, "minDuration")?,
        int_param(&query, "maxDuration")?,
    );
    let popularity = range_filter(
        "popularity",
        int_param(&query, "minPopularity")?,
        int_param(&query, "maxPopularity")?,
    );
    for filter in [duration, popularity].into_iter().flatten() {
        read = read.filter(filter);
    }

    let result = state.catalog.execute_read(ResourceKind::Track, &read).await?;
    let views = track_views(state.catalog.as_ref(), state.blobs.as_ref(), &result.items).await?;
    Ok(Json(PaginatedResponse::new(views, page.pagination(result.total))))
}

/// GET /api/tracks/recent
pub async fn recent_tracks(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Value>>>> {
    let read = ReadQuery::new()
        .sort(SortSpec::desc("createdAt"))
        .limit(TOP_N);
    let tracks = state.catalog.execute_read(ResourceKind::Track, &read).await?.items;
    let views = track_views(state.catalog.as_ref(), state.blobs.as_ref(), &tracks).await?;
    Ok(Json(ApiResponse::ok(views)))
}

/// GET /api/tracks/search/query?query=..
pub async fn search_tracks(
    State(state): State<AppState>,
    Query(query): Query<QueryMap>,
) -> Result<Json<ApiResponse<Vec<Value>>>> {
    let term = search_term(&query)?;
    let read = ReadQuery::new()
        .filter(Filter::text(&["title", "lyrics"], term))
        .sort(SortSpec::desc("popularity"))
        .limit(TOP_N);
    let tracks = state.catalog.execute_read(ResourceKind::Track, &read).await?.items;
    let views = track_views(state.catalog.as_ref(), state.blobs.as_ref(), &tracks).await?;
    Ok(Json(ApiResponse::ok(views)))
}

/// GET /api/tracks/:id
pub async fn get_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    let track = state.require(ResourceKind::Track, &id).await?;
    let view = track_view(state.catalog.as_ref(), state.blobs.as_ref(), &track).await?;
    Ok(Json(ApiResponse::ok(view)))
}

// == Writes ==
/// POST /api/tracks
pub async fn create_track(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Value>>)> {
    let payload: TrackPayload = parse_payload(body)?;
    let document = with_album_artist(&state, to_document(&payload)?, &payload.album_id).await?;

    let created = state
        .commit_write(ResourceKind::Track, WriteOp::Create(document))
        .await?;
    let view = track_view(state.catalog.as_ref(), state.blobs.as_ref(), &created).await;
    let view = committed_view(ResourceKind::Track, view, created);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(view))))
}

/// PUT /api/tracks/:id
pub async fn update_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<Value>>> {
    let patch: TrackPatch = parse_payload(body)?;
    let mut document = to_document(&patch)?;
    if let Some(album_id) = &patch.album_id {
        document = with_album_artist(&state, document, album_id).await?;
    }

    let updated = state
        .commit_write(ResourceKind::Track, WriteOp::Update { id, patch: document })
        .await?;
    let view = track_view(state.catalog.as_ref(), state.blobs.as_ref(), &updated).await;
    let view = committed_view(ResourceKind::Track, view, updated);
    Ok(Json(ApiResponse::ok(view)))
}

/// PATCH /api/tracks/:id/popularity
pub async fn update_popularity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<Value>>> {
    let update: PopularityUpdate = parse_payload(body)?;
    let updated = state
        .commit_write(
            ResourceKind::Track,
            WriteOp::Update {
                id,
                patch: json!({ "popularity": update.popularity }),
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(updated)))
}

/// DELETE /api/tracks/:id
pub async fn delete_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state
        .commit_write(ResourceKind::Track, WriteOp::Delete { id })
        .await?;
    Ok(Json(ApiResponse::message("Track deleted")))
}
