//! Request DTOs for the catalog API
//!
//! Create payloads carry every required field; patch payloads make every
//! field optional and serialize only what the client sent, so they can be
//! merged into the stored document as-is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Implemented by every request body; returns the first failure message.
pub trait Validate {
    fn validate(&self) -> Option<String>;
}

const MAX_POPULARITY: u32 = 100;

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn check_popularity(popularity: Option<u32>) -> Option<String> {
    popularity
        .filter(|p| *p > MAX_POPULARITY)
        .map(|_| format!("popularity must be between 0 and {}", MAX_POPULARITY))
}

fn check_date(field: &str, value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .err()
        .map(|_| format!("{} must be a date formatted YYYY-MM-DD", field))
}

fn default_true() -> bool {
    true
}

// == Shared ==
/// Image references at three sizes; each is an object key or a URL under
/// the blob store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<String>,
}

// == Artists ==
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSet>,
}

impl Validate for ArtistPayload {
    fn validate(&self) -> Option<String> {
        if blank(&self.name) {
            return Some("name cannot be empty".to_string());
        }
        check_popularity(Some(self.popularity))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSet>,
}

impl Validate for ArtistPatch {
    fn validate(&self) -> Option<String> {
        if self.name.as_deref().is_some_and(blank) {
            return Some("name cannot be empty".to_string());
        }
        check_popularity(self.popularity)
    }
}

// == Albums ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumType {
    #[default]
    Album,
    Single,
    Ep,
}

impl AlbumType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "album" => Some(AlbumType::Album),
            "single" => Some(AlbumType::Single),
            "ep" => Some(AlbumType::Ep),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlbumType::Album => "album",
            AlbumType::Single => "single",
            AlbumType::Ep => "ep",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPayload {
    pub title: String,
    pub artist_id: String,
    pub release_date: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<ImageSet>,
    #[serde(rename = "type", default)]
    pub album_type: AlbumType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default)]
    pub featuring: Vec<String>,
    #[serde(default)]
    pub track_count: u32,
}

impl Validate for AlbumPayload {
    fn validate(&self) -> Option<String> {
        if blank(&self.title) {
            return Some("title cannot be empty".to_string());
        }
        if blank(&self.artist_id) {
            return Some("artistId is required".to_string());
        }
        check_date("releaseDate", &self.release_date)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<ImageSet>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub album_type: Option<AlbumType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featuring: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_count: Option<u32>,
}

impl Validate for AlbumPatch {
    fn validate(&self) -> Option<String> {
        if self.title.as_deref().is_some_and(blank) {
            return Some("title cannot be empty".to_string());
        }
        if self.artist_id.as_deref().is_some_and(blank) {
            return Some("artistId cannot be empty".to_string());
        }
        self.release_date
            .as_deref()
            .and_then(|date| check_date("releaseDate", date))
    }
}

// == Tracks ==
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPayload {
    pub title: String,
    pub album_id: String,
    /// Seconds
    pub duration: u32,
    pub file_url: String,
    pub track_number: u32,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub featuring: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

impl Validate for TrackPayload {
    fn validate(&self) -> Option<String> {
        if blank(&self.title) {
            return Some("title cannot be empty".to_string());
        }
        if blank(&self.album_id) {
            return Some("albumId is required".to_string());
        }
        if self.duration == 0 {
            return Some("duration must be positive".to_string());
        }
        if blank(&self.file_url) {
            return Some("fileUrl is required".to_string());
        }
        if self.track_number == 0 {
            return Some("trackNumber must start at 1".to_string());
        }
        check_popularity(Some(self.popularity))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featuring: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

impl Validate for TrackPatch {
    fn validate(&self) -> Option<String> {
        if self.title.as_deref().is_some_and(blank) {
            return Some("title cannot be empty".to_string());
        }
        if self.album_id.as_deref().is_some_and(blank) {
            return Some("albumId cannot be empty".to_string());
        }
        if self.duration == Some(0) {
            return Some("duration must be positive".to_string());
        }
        if self.file_url.as_deref().is_some_and(blank) {
            return Some("fileUrl cannot be empty".to_string());
        }
        if self.track_number == Some(0) {
            return Some("trackNumber must start at 1".to_string());
        }
        check_popularity(self.popularity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityUpdate {
    pub popularity: u32,
}

impl Validate for PopularityUpdate {
    fn validate(&self) -> Option<String> {
        check_popularity(Some(self.popularity))
    }
}

// == Playlists ==
const MAX_PLAYLIST_NAME: usize = 100;
const MAX_PLAYLIST_DESCRIPTION: usize = 500;

fn check_playlist_text(name: Option<&str>, description: Option<&str>) -> Option<String> {
    if let Some(name) = name {
        let len = name.trim().chars().count();
        if len == 0 || len > MAX_PLAYLIST_NAME {
            return Some(format!(
                "name must be between 1 and {} characters",
                MAX_PLAYLIST_NAME
            ));
        }
    }
    description
        .filter(|d| d.trim().chars().count() > MAX_PLAYLIST_DESCRIPTION)
        .map(|_| {
            format!(
                "description cannot exceed {} characters",
                MAX_PLAYLIST_DESCRIPTION
            )
        })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub tracks: Vec<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<ImageSet>,
}

impl Validate for PlaylistPayload {
    fn validate(&self) -> Option<String> {
        if blank(&self.user_id) {
            return Some("userId is required".to_string());
        }
        check_playlist_text(Some(&self.name), self.description.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<ImageSet>,
}

impl Validate for PlaylistPatch {
    fn validate(&self) -> Option<String> {
        check_playlist_text(self.name.as_deref(), self.description.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistTrackRequest {
    pub track_id: String,
}

impl Validate for PlaylistTrackRequest {
    fn validate(&self) -> Option<String> {
        blank(&self.track_id).then(|| "trackId is required".to_string())
    }
}
