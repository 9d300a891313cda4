//! Album handlers

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
use crate::catalog::projection::{album_compact, album_view, track_views};
use crate::catalog::{Filter, ReadQuery, ResourceKind, SortSpec, WriteOp};
use crate::error::{ApiError, Result};
use crate::models::{AlbumPatch, AlbumPayload, AlbumType, ApiResponse, PaginatedResponse};

const SORTABLE: [&str; 4] = ["title", "releaseDate", "trackCount", "createdAt"];

async fn album_views(state: &AppState, albums: &[Value]) -> Result<Vec<Value>> {
    let mut views = Vec::with_capacity(albums.len());
    for album in albums {
        views.push(album_view(state.catalog.as_ref(), state.blobs.as_ref(), album).await?);
    }
    Ok(views)
}

/// `releaseDate` bounds for a `fromYear`..=`toYear` span.
fn year_range(from: Option<i64>, to: Option<i64>) -> Filter {
    Filter::range(
        "releaseDate",
        from.map(|y| json!(format!("{:04}-01-01", y))),
        to.map(|y| json!(format!("{:04}-12-31", y))),
    )
}

// == Reads ==
/// GET /api/albums
pub async fn list_albums(
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
    if let Some(raw) = text_param(&query, "type") {
        let album_type = AlbumType::parse(raw).ok_or_else(|| {
            ApiError::InvalidRequest("type must be one of album, single, ep".to_string())
        })?;
        read = read.filter(Filter::eq("type", album_type.as_str()));
    }
    if let Some(genre) = text_param(&query, "genre") {
        read = read.filter(Filter::contains("genres", genre));
    }
    if let Some(year) = int_param(&query, "year")? {
        read = read.filter(year_range(Some(year), Some(year)));
    } else {
        let from = int_param(&query, "fromYear")?;
        let to = int_param(&query, "toYear")?;
        if from.is_some() || to.is_some() {
            read = read.filter(year_range(from, to));
        }
    }

    let result = state.catalog.execute_read(ResourceKind::Album, &read).await?;
    Ok(Json(PaginatedResponse::new(
        album_views(&state, &result.items).await?,
        page.pagination(result.total),
    )))
}

/// GET /api/albums/recent
pub async fn recent_albums(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Value>>>> {
    let read = ReadQuery::new()
        .sort(SortSpec::desc("releaseDate"))
        .limit(TOP_N);
    let albums = state.catalog.execute_read(ResourceKind::Album, &read).await?.items;

    let mut compact = Vec::with_capacity(albums.len());
    for album in &albums {
        compact.push(album_compact(state.catalog.as_ref(), state.blobs.as_ref(), album).await?);
    }
    Ok(Json(ApiResponse::ok(compact)))
}

/// GET /api/albums/search/query?query=..
pub async fn search_albums(
    State(state): State<AppState>,
    Query(query): Query<QueryMap>,
) -> Result<Json<ApiResponse<Vec<Value>>>> {
    let term = search_term(&query)?;
    let read = ReadQuery::new()
        .filter(Filter::text(&["title", "label"], term))
        .sort(SortSpec::desc("releaseDate"))
        .limit(TOP_N);
    let albums = state.catalog.execute_read(ResourceKind::Album, &read).await?.items;
    Ok(Json(ApiResponse::ok(album_views(&state, &albums).await?)))
}

/// GET /api/albums/artist/:artistId
pub async fn albums_by_artist(
    State(state): State<AppState>,
    Path(artist_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Value>>>> {
    let read = ReadQuery::new()
        .filter(Filter::eq("artistId", artist_id.as_str()))
        .sort(SortSpec::desc("releaseDate"));
    let albums = state.catalog.execute_read(ResourceKind::Album, &read).await?.items;
    Ok(Json(ApiResponse::ok(album_views(&state, &albums).await?)))
}

/// GET /api/albums/:id
pub async fn get_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    let album = state.require(ResourceKind::Album, &id).await?;
    let view = album_view(state.catalog.as_ref(), state.blobs.as_ref(), &album).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/albums/:id/tracks
pub async fn album_tracks(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Value>>>> {
    state.require(ResourceKind::Album, &id).await?;
    let read = ReadQuery::new()
        .filter(Filter::eq("albumId", id.as_str()))
        .sort(SortSpec::asc("trackNumber"));
    let tracks = state.catalog.execute_read(ResourceKind::Track, &read).await?.items;
    let views = track_views(state.catalog.as_ref(), state.blobs.as_ref(), &tracks).await?;
    Ok(Json(ApiResponse::ok(views)))
}

// == Writes ==
/// POST /api/albums
pub async fn create_album(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Value>>)> {
    let payload: AlbumPayload = parse_payload(body)?;
    state.require(ResourceKind::Artist, &payload.artist_id).await?;

    let created = state
        .commit_write(ResourceKind::Album, WriteOp::Create(to_document(&payload)?))
        .await?;
    let view = album_view(state.catalog.as_ref(), state.blobs.as_ref(), &created).await;
    let view = committed_view(ResourceKind::Album, view, created);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(view))))
}

/// PUT /api/albums/:id
pub async fn update_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<Value>>> {
    let patch: AlbumPatch = parse_payload(body)?;
    if let Some(artist_id) = &patch.artist_id {
        state.require(ResourceKind::Artist, artist_id).await?;
    }

    let updated = state
        .commit_write(
            ResourceKind::Album,
            WriteOp::Update {
                id,
                patch: to_document(&patch)?,
            },
        )
        .await?;
    let view = album_view(state.catalog.as_ref(), state.blobs.as_ref(), &updated).await;
    let view = committed_view(ResourceKind::Album, view, updated);
    Ok(Json(ApiResponse::ok(view)))
}

/// DELETE /api/albums/:id
pub async fn delete_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state
        .commit_write(ResourceKind::Album, WriteOp::Delete { id })
        .await?;
    Ok(Json(ApiResponse::message("Album deleted")))
}
