//! Playlist handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::api::params::{PageRequest, QueryMap};
use crate::api::state::{committed_view, parse_payload, to_document, AppState};
use crate::catalog::projection::playlist_view;
use crate::catalog::{Filter, ReadQuery, ResourceKind, SortSpec, WriteOp};
use crate::error::{ApiError, Result};
use crate::models::{
    ApiResponse, PaginatedResponse, PlaylistPatch, PlaylistPayload, PlaylistTrackRequest,
};

fn track_ids(playlist: &Value) -> Vec<String> {
    playlist
        .get("tracks")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Fails with `NotFound` unless every id names an existing track.
async fn ensure_tracks_exist(state: &AppState, ids: &[String]) -> Result<()> {
    for id in ids {
        state.require(ResourceKind::Track, id).await?;
    }
    Ok(())
}

async fn view(state: &AppState, playlist: &Value) -> Result<Value> {
    playlist_view(state.catalog.as_ref(), state.blobs.as_ref(), playlist).await
}

async fn view_committed(state: &AppState, committed: Value) -> Value {
    let projected = view(state, &committed).await;
    committed_view(ResourceKind::Playlist, projected, committed)
}

async fn replace_tracks(state: &AppState, id: String, tracks: Vec<String>) -> Result<Value> {
    let updated = state
        .commit_write(
            ResourceKind::Playlist,
            WriteOp::Update {
                id,
                patch: json!({ "tracks": tracks }),
            },
        )
        .await?;
    Ok(view_committed(state, updated).await)
}

// == Reads ==
/// GET /api/playlists/public
pub async fn public_playlists(
    State(state): State<AppState>,
    Query(query): Query<QueryMap>,
) -> Result<Json<PaginatedResponse<Value>>> {
    let page = PageRequest::from_query(&query);
    let read = ReadQuery::new()
        .filter(Filter::eq("isPublic", true))
        .sort(SortSpec::desc("createdAt"))
        .window(page.skip(), page.limit());
    let result = state.catalog.execute_read(ResourceKind::Playlist, &read).await?;

    let mut views = Vec::with_capacity(result.items.len());
    for playlist in &result.items {
        views.push(view(&state, playlist).await?);
    }
    Ok(Json(PaginatedResponse::new(views, page.pagination(result.total))))
}

/// GET /api/playlists/:id
pub async fn get_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    let playlist = state.require(ResourceKind::Playlist, &id).await?;
    Ok(Json(ApiResponse::ok(view(&state, &playlist).await?)))
}

// == Writes ==
/// POST /api/playlists
pub async fn create_playlist(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Value>>)> {
    let payload: PlaylistPayload = parse_payload(body)?;
    ensure_tracks_exist(&state, &payload.tracks).await?;

    let created = state
        .commit_write(ResourceKind::Playlist, WriteOp::Create(to_document(&payload)?))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(view_committed(&state, created).await)),
    ))
}

/// PUT /api/playlists/:id
pub async fn update_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<Value>>> {
    let patch: PlaylistPatch = parse_payload(body)?;
    if let Some(tracks) = &patch.tracks {
        ensure_tracks_exist(&state, tracks).await?;
    }

    let updated = state
        .commit_write(
            ResourceKind::Playlist,
            WriteOp::Update {
                id,
                patch: to_document(&patch)?,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(view_committed(&state, updated).await)))
}

/// DELETE /api/playlists/:id
pub async fn delete_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state
        .commit_write(ResourceKind::Playlist, WriteOp::Delete { id })
        .await?;
    Ok(Json(ApiResponse::message("Playlist deleted")))
}

/// POST /api/playlists/:id/tracks
pub async fn add_playlist_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<Value>>> {
    let request: PlaylistTrackRequest = parse_payload(body)?;
    let playlist = state.require(ResourceKind::Playlist, &id).await?;
    state.require(ResourceKind::Track, &request.track_id).await?;

    let mut tracks = track_ids(&playlist);
    if tracks.contains(&request.track_id) {
        return Err(ApiError::InvalidRequest(
            "track is already in the playlist".to_string(),
        ));
    }
    tracks.push(request.track_id);

    Ok(Json(ApiResponse::ok(replace_tracks(&state, id, tracks).await?)))
}

/// DELETE /api/playlists/:id/tracks/:trackId
pub async fn remove_playlist_track(
    State(state): State<AppState>,
    Path((id, track_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Value>>> {
    let playlist = state.require(ResourceKind::Playlist, &id).await?;

    let mut tracks = track_ids(&playlist);
    let before = tracks.len();
    tracks.retain(|t| *t != track_id);
    if tracks.len() == before {
        return Err(ApiError::InvalidRequest(
            "track is not in the playlist".to_string(),
        ));
    }

    Ok(Json(ApiResponse::ok(replace_tracks(&state, id, tracks).await?)))
}
