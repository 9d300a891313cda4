//! Artist handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::api::params::{
    int_param, search_term, sort_from_query, text_param, PageRequest, QueryMap, TOP_N,
};
use crate::api::state::{parse_payload, to_document, AppState};
use crate::catalog::projection::{album_compact, artist_view, track_views};
use crate::catalog::{Filter, ReadQuery, ResourceKind, SortSpec, WriteOp};
use crate::error::Result;
use crate::models::{ApiResponse, ArtistPatch, ArtistPayload, PaginatedResponse};

const SORTABLE: [&str; 3] = ["name", "popularity", "createdAt"];

fn artist_views(state: &AppState, artists: &[Value]) -> Vec<Value> {
    artists
        .iter()
        .map(|artist| artist_view(state.blobs.as_ref(), artist))
        .collect()
}

// == Reads ==
/// GET /api/artists
pub async fn list_artists(
    State(state): State<AppState>,
    Query(query): Query<QueryMap>,
) -> Result<Json<PaginatedResponse<Value>>> {
    let page = PageRequest::from_query(&query);
    let mut read = ReadQuery::new()
        .sort(sort_from_query(&query, &SORTABLE))
        .window(page.skip(), page.limit());

    if let Some(genre) = text_param(&query, "genre") {
        read = read.filter(Filter::contains("genres", genre));
    }
    if let Some(name) = text_param(&query, "name") {
        read = read.filter(Filter::text(&["name"], name));
    }
    let min = int_param(&query, "minPopularity")?;
    let max = int_param(&query, "maxPopularity")?;
    if min.is_some() || max.is_some() {
        read = read.filter(Filter::range("popularity", min.map(Value::from), max.map(Value::from)));
    }

    let result = state.catalog.execute_read(ResourceKind::Artist, &read).await?;
    Ok(Json(PaginatedResponse::new(
        artist_views(&state, &result.items),
        page.pagination(result.total),
    )))
}

/// GET /api/artists/popular
pub async fn popular_artists(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Value>>>> {
    let read = ReadQuery::new()
        .sort(SortSpec::desc("popularity"))
        .limit(TOP_N);
    let result = state.catalog.execute_read(ResourceKind::Artist, &read).await?;
    Ok(Json(ApiResponse::ok(artist_views(&state, &result.items))))
}

/// GET /api/artists/search/query?query=..
pub async fn search_artists(
    State(state): State<AppState>,
    Query(query): Query<QueryMap>,
) -> Result<Json<ApiResponse<Vec<Value>>>> {
    let term = search_term(&query)?;
    let read = ReadQuery::new()
        .filter(Filter::text(&["name", "bio"], term))
        .sort(SortSpec::desc("popularity"))
        .limit(TOP_N);
    let result = state.catalog.execute_read(ResourceKind::Artist, &read).await?;
    Ok(Json(ApiResponse::ok(artist_views(&state, &result.items))))
}

/// GET /api/artists/:id
pub async fn get_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    let artist = state.require(ResourceKind::Artist, &id).await?;
    let albums = state
        .catalog
        .execute_read(
            ResourceKind::Album,
            &ReadQuery::new()
                .filter(Filter::eq("artistId", id.as_str()))
                .sort(SortSpec::desc("releaseDate")),
        )
        .await?
        .items;

    let mut compact = Vec::with_capacity(albums.len());
    for album in &albums {
        compact.push(album_compact(state.catalog.as_ref(), state.blobs.as_ref(), album).await?);
    }

    let mut view = artist_view(state.blobs.as_ref(), &artist);
    if let Value::Object(map) = &mut view {
        map.insert("albumCount".to_string(), json!(compact.len()));
        map.insert("albums".to_string(), Value::Array(compact));
    }
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/artists/:id/top-tracks
pub async fn artist_top_tracks(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Value>>>> {
    state.require(ResourceKind::Artist, &id).await?;
    let read = ReadQuery::new()
        .filter(Filter::eq("artistId", id.as_str()))
        .sort(SortSpec::desc("popularity"))
        .limit(TOP_N);
    let tracks = state.catalog.execute_read(ResourceKind::Track, &read).await?.items;
    let views = track_views(state.catalog.as_ref(), state.blobs.as_ref(), &tracks).await?;
    Ok(Json(ApiResponse::ok(views)))
}

// == Writes ==
/// POST /api/artists
pub async fn create_artist(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Value>>)> {
    let payload: ArtistPayload = parse_payload(body)?;

    let created = state
        .commit_write(ResourceKind::Artist, WriteOp::Create(to_document(&payload)?))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(artist_view(state.blobs.as_ref(), &created))),
    ))
}

/// PUT /api/artists/:id
pub async fn update_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<Value>>> {
    let patch: ArtistPatch = parse_payload(body)?;

    let updated = state
        .commit_write(
            ResourceKind::Artist,
            WriteOp::Update {
                id,
                patch: to_document(&patch)?,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(artist_view(state.blobs.as_ref(), &updated))))
}

/// DELETE /api/artists/:id
pub async fn delete_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state
        .commit_write(ResourceKind::Artist, WriteOp::Delete { id })
        .await?;
    Ok(Json(ApiResponse::message("Artist deleted")))
}
