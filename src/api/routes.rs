//! API Routes
//!
//! Every cacheable GET route is mounted with its own read-through layer and
//! policy. Writes and the operational endpoints are never cached.

use axum::{
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{albums, artists, health_handler, playlists, search, stats_handler, tracks};
use super::state::AppState;
use crate::cache::{read_through, ReadThrough, RoutePolicy};

// == Cache Policies ==
pub const ARTISTS_LIST: RoutePolicy = RoutePolicy::new("artists-list", 1200);
pub const ARTISTS_POPULAR: RoutePolicy = RoutePolicy::new("artists-popular", 600);
pub const ARTIST_SEARCH: RoutePolicy = RoutePolicy::new("artist-search", 600);
pub const ARTIST_DETAIL: RoutePolicy = RoutePolicy::new("artist-detail", 1800);
pub const ARTIST_TOP_TRACKS: RoutePolicy = RoutePolicy::new("artist-top-tracks", 1800);

pub const ALBUMS_LIST: RoutePolicy = RoutePolicy::new("albums-list", 1200);
pub const ALBUMS_RECENT: RoutePolicy = RoutePolicy::new("albums-recent", 600);
pub const ALBUM_SEARCH: RoutePolicy = RoutePolicy::new("album-search", 600);
pub const ALBUMS_BY_ARTIST: RoutePolicy = RoutePolicy::new("albums-by-artist", 1200);
pub const ALBUM_DETAIL: RoutePolicy = RoutePolicy::new("album-detail", 1800);
pub const ALBUM_TRACKS: RoutePolicy = RoutePolicy::new("album-tracks", 1800);

pub const TRACKS_LIST: RoutePolicy = RoutePolicy::new("tracks-list", 1200);
pub const TRACKS_RECENT: RoutePolicy = RoutePolicy::new("tracks-recent", 600);
pub const TRACK_SEARCH: RoutePolicy = RoutePolicy::new("track-search", 600);
pub const TRACK_DETAIL: RoutePolicy = RoutePolicy::new("track-detail", 1800);

pub const PLAYLISTS_PUBLIC: RoutePolicy = RoutePolicy::new("playlists-public", 600);
pub const PLAYLIST_DETAIL: RoutePolicy = RoutePolicy::new("playlist-detail", 600);

pub const GLOBAL_SEARCH: RoutePolicy = RoutePolicy::new("global-search", 600);

/// GET route wrapped in the read-through cache.
fn cached<H, T>(state: &AppState, policy: RoutePolicy, handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler).layer(from_fn_with_state(
        ReadThrough::new(state.cache.clone(), policy),
        read_through,
    ))
}

fn artist_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            cached(state, ARTISTS_LIST, artists::list_artists).post(artists::create_artist),
        )
        .route("/popular", cached(state, ARTISTS_POPULAR, artists::popular_artists))
        .route("/search/query", cached(state, ARTIST_SEARCH, artists::search_artists))
        .route(
            "/:id",
            cached(state, ARTIST_DETAIL, artists::get_artist)
                .put(artists::update_artist)
                .delete(artists::delete_artist),
        )
        .route(
            "/:id/top-tracks",
            cached(state, ARTIST_TOP_TRACKS, artists::artist_top_tracks),
        )
}

fn album_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            cached(state, ALBUMS_LIST, albums::list_albums).post(albums::create_album),
        )
        .route("/recent", cached(state, ALBUMS_RECENT, albums::recent_albums))
        .route("/search/query", cached(state, ALBUM_SEARCH, albums::search_albums))
        .route(
            "/artist/:artistId",
            cached(state, ALBUMS_BY_ARTIST, albums::albums_by_artist),
        )
        .route(
            "/:id",
            cached(state, ALBUM_DETAIL, albums::get_album)
                .put(albums::update_album)
                .delete(albums::delete_album),
        )
        .route("/:id/tracks", cached(state, ALBUM_TRACKS, albums::album_tracks))
}

fn track_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            cached(state, TRACKS_LIST, tracks::list_tracks).post(tracks::create_track),
        )
        .route("/recent", cached(state, TRACKS_RECENT, tracks::recent_tracks))
        .route("/search/query", cached(state, TRACK_SEARCH, tracks::search_tracks))
        .route(
            "/:id",
            cached(state, TRACK_DETAIL, tracks::get_track)
                .put(tracks::update_track)
                .delete(tracks::delete_track),
        )
        .route("/:id/popularity", patch(tracks::update_popularity))
}

fn playlist_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(playlists::create_playlist))
        .route(
            "/public",
            cached(state, PLAYLISTS_PUBLIC, playlists::public_playlists),
        )
        .route(
            "/:id",
            cached(state, PLAYLIST_DETAIL, playlists::get_playlist)
                .put(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route("/:id/tracks", post(playlists::add_playlist_track))
        .route("/:id/tracks/:trackId", delete(playlists::remove_playlist_track))
}

/// Creates the main router.
///
/// # Endpoints
/// - `/api/artists`, `/api/albums`, `/api/tracks`, `/api/playlists` - catalog CRUD and listings
/// - `GET /api/search/:value` - search across tracks, artists and albums
/// - `GET /health` - health check including cache reachability
/// - `GET /cache/stats` - cache counters
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .nest("/artists", artist_routes(&state))
        .nest("/albums", album_routes(&state))
        .nest("/tracks", track_routes(&state))
        .nest("/playlists", playlist_routes(&state))
        .route(
            "/search/:value",
            cached(&state, GLOBAL_SEARCH, search::global_search),
        );

    Router::new()
        .route("/health", get(health_handler))
        .route("/cache/stats", get(stats_handler))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    use crate::cache::MemoryStore;
    use crate::config::Config;

    fn create_test_app() -> (Router, AppState) {
        let state = AppState::from_config(&Config::default(), Arc::new(MemoryStore::new(100)));
        (create_router(state.clone()), state)
    }

    async fn get_status(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _) = create_test_app();
        assert_eq!(get_status(app, "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint_is_not_cached() {
        let (app, state) = create_test_app();
        assert_eq!(get_status(app, "/cache/stats").await, StatusCode::OK);
        assert_eq!(state.cache.len().await, Some(0));
    }

    #[tokio::test]
    async fn test_static_segments_win_over_ids() {
        let (app, state) = create_test_app();

        assert_eq!(get_status(app.clone(), "/api/artists/popular").await, StatusCode::OK);
        assert_eq!(get_status(app.clone(), "/api/albums/recent").await, StatusCode::OK);
        assert_eq!(get_status(app, "/api/tracks/recent").await, StatusCode::OK);

        assert_eq!(state.cache.len().await, Some(3));
    }

    #[tokio::test]
    async fn test_unknown_ids_are_404_and_not_cached() {
        let (app, state) = create_test_app();

        for uri in [
            "/api/artists/nope",
            "/api/albums/nope",
            "/api/albums/nope/tracks",
            "/api/tracks/nope",
            "/api/playlists/nope",
            "/api/artists/nope/top-tracks",
        ] {
            assert_eq!(get_status(app.clone(), uri).await, StatusCode::NOT_FOUND, "{}", uri);
        }
        assert_eq!(state.cache.len().await, Some(0));
    }

    #[tokio::test]
    async fn test_search_without_query_is_rejected() {
        let (app, _) = create_test_app();
        assert_eq!(
            get_status(app, "/api/tracks/search/query").await,
            StatusCode::BAD_REQUEST
        );
    }
}
