//! Request and response models for the catalog API

pub mod requests;
pub mod responses;

pub use requests::{
    AlbumPatch, AlbumPayload, AlbumType, ArtistPatch, ArtistPayload, ImageSet, PlaylistPatch,
    PlaylistPayload, PlaylistTrackRequest, PopularityUpdate, TrackPatch, TrackPayload, Validate,
};
pub use responses::{
    ApiResponse, CacheHealth, HealthResponse, PaginatedResponse, Pagination, StatsResponse,
};
