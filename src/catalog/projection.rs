//! Response projections: references resolved to embedded summaries and media
//! references replaced by signed URLs.

use serde_json::{json, Map, Value};

use super::{BlobStore, CatalogStore, Filter, ReadQuery, ResourceKind};
use crate::error::Result;

/// Placeholder artwork for documents without a signable image.
pub const DEFAULT_IMAGE: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='200' height='200'%3E%3Crect width='200' height='200' fill='%232A2A2A'/%3E%3C/svg%3E";

const UNKNOWN_ARTIST: &str = "Unknown artist";

fn str_field<'a>(doc: &'a Value, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

fn with_fields(doc: &Value, extra: Vec<(&str, Value)>) -> Value {
    let mut map = doc.as_object().cloned().unwrap_or_else(Map::new);
    for (field, value) in extra {
        map.insert(field.to_string(), value);
    }
    Value::Object(map)
}

// == Media ==
/// Signed URL of the preferred size of an image set (medium, large,
/// thumbnail), or the placeholder.
pub fn cover_url(blobs: &dyn BlobStore, images: Option<&Value>) -> String {
    images
        .and_then(|set| {
            ["medium", "large", "thumbnail"]
                .iter()
                .find_map(|size| set.get(*size).and_then(Value::as_str))
        })
        .and_then(|reference| blobs.signed_url(reference))
        .unwrap_or_else(|| DEFAULT_IMAGE.to_string())
}

/// Every size of an image set signed; unsignable sizes become `null`.
pub fn signed_image_set(blobs: &dyn BlobStore, images: Option<&Value>) -> Value {
    let Some(Value::Object(set)) = images else {
        return Value::Null;
    };
    let signed: Map<String, Value> = set
        .iter()
        .map(|(size, reference)| {
            let url = reference
                .as_str()
                .and_then(|r| blobs.signed_url(r))
                .map_or(Value::Null, Value::String);
            (size.clone(), url)
        })
        .collect();
    Value::Object(signed)
}

fn audio_url(blobs: &dyn BlobStore, track: &Value) -> Value {
    str_field(track, "fileUrl")
        .and_then(|reference| blobs.signed_url(reference))
        .map_or(Value::Null, Value::String)
}

// == Summaries ==
/// `{id, name}` of an artist, `null` when the id is dangling.
pub async fn artist_summary(catalog: &dyn CatalogStore, artist_id: Option<&str>) -> Result<Value> {
    let Some(id) = artist_id else {
        return Ok(Value::Null);
    };
    Ok(catalog
        .find_by_id(ResourceKind::Artist, id)
        .await?
        .map_or(Value::Null, |artist| {
            json!({ "id": artist["id"], "name": artist["name"] })
        }))
}

async fn artist_name(catalog: &dyn CatalogStore, artist_id: Option<&str>) -> Result<Value> {
    let summary = artist_summary(catalog, artist_id).await?;
    Ok(summary
        .get("name")
        .cloned()
        .unwrap_or_else(|| Value::String(UNKNOWN_ARTIST.to_string())))
}

// == Artists ==
pub fn artist_view(blobs: &dyn BlobStore, artist: &Value) -> Value {
    with_fields(
        artist,
        vec![
            ("image", signed_image_set(blobs, artist.get("image"))),
            ("imageUrl", Value::String(cover_url(blobs, artist.get("image")))),
        ],
    )
}

// == Albums ==
/// Album with its artist embedded and cover images signed.
pub async fn album_view(
    catalog: &dyn CatalogStore,
    blobs: &dyn BlobStore,
    album: &Value,
) -> Result<Value> {
    let artist = artist_summary(catalog, str_field(album, "artistId")).await?;
    Ok(with_fields(
        album,
        vec![
            ("artist", artist),
            ("coverImage", signed_image_set(blobs, album.get("coverImage"))),
            ("coverUrl", Value::String(cover_url(blobs, album.get("coverImage")))),
        ],
    ))
}

/// `{id, title, artist, coverUrl, year}` used by listings of recent albums.
pub async fn album_compact(
    catalog: &dyn CatalogStore,
    blobs: &dyn BlobStore,
    album: &Value,
) -> Result<Value> {
    let year = str_field(album, "releaseDate")
        .and_then(|date| date.get(..4))
        .and_then(|y| y.parse::<i32>().ok());
    let artist = artist_name(catalog, str_field(album, "artistId")).await?;
    Ok(json!({
        "id": album["id"],
        "title": album["title"],
        "artist": artist,
        "coverUrl": cover_url(blobs, album.get("coverImage")),
        "year": year,
    }))
}

// == Tracks ==
/// Track with its album and artist embedded, cover and audio URLs signed.
pub async fn track_view(
    catalog: &dyn CatalogStore,
    blobs: &dyn BlobStore,
    track: &Value,
) -> Result<Value> {
    let album = match str_field(track, "albumId") {
        Some(id) => catalog.find_by_id(ResourceKind::Album, id).await?,
        None => None,
    };
    let album_summary = album.as_ref().map_or(Value::Null, |album| {
        json!({
            "id": album["id"],
            "title": album["title"],
            "type": album["type"],
            "releaseDate": album["releaseDate"],
        })
    });
    let cover = cover_url(blobs, album.as_ref().and_then(|a| a.get("coverImage")));

    let artist = artist_name(catalog, str_field(track, "artistId")).await?;

    Ok(with_fields(
        track,
        vec![
            ("album", album_summary),
            ("artist", artist),
            ("coverUrl", Value::String(cover)),
            ("audioUrl", audio_url(blobs, track)),
        ],
    ))
}

pub async fn track_views(
    catalog: &dyn CatalogStore,
    blobs: &dyn BlobStore,
    tracks: &[Value],
) -> Result<Vec<Value>> {
    let mut views = Vec::with_capacity(tracks.len());
    for track in tracks {
        views.push(track_view(catalog, blobs, track).await?);
    }
    Ok(views)
}

// == Playlists ==
/// Playlist with tracks populated in playlist order and totals computed
/// from the tracks that still exist.
pub async fn playlist_view(
    catalog: &dyn CatalogStore,
    blobs: &dyn BlobStore,
    playlist: &Value,
) -> Result<Value> {
    let ids: Vec<Value> = playlist
        .get("tracks")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let found = catalog
        .execute_read(
            ResourceKind::Track,
            &ReadQuery::new().filter(Filter::any_of("id", ids.clone())),
        )
        .await?
        .items;

    let ordered: Vec<Value> = ids
        .iter()
        .filter_map(|id| found.iter().find(|t| t.get("id") == Some(id)).cloned())
        .collect();
    let total_duration: u64 = ordered
        .iter()
        .filter_map(|t| t.get("duration").and_then(Value::as_u64))
        .sum();

    Ok(with_fields(
        playlist,
        vec![
            ("totalTracks", json!(ordered.len())),
            ("totalDuration", json!(total_duration)),
            ("tracks", Value::Array(track_views(catalog, blobs, &ordered).await?)),
        ],
    ))
}
