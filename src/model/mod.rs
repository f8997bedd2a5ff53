//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (views, filters, UI state, generation tokens)
//! - `content`: Catalog entities and their normalization from backend rows
//! - `playback`: Playback session, play queue and lyric tracking
//! - `projection`: Filter, search and pagination of collections for display
//! - `cache`: Persisted favorites set
//! - `sample`: Bundled fallback catalog
//! - `api_client`: REST gateway to the ACIDWAVE backend
//! - `app_model`: Main application model with state management methods

mod types;
mod content;
mod playback;
mod projection;
mod cache;
mod sample;
mod api_client;
mod app_model;

pub use types::{Catalog, DetailView, GENRES, InputMode, RequestKind, UiState, View, ViewFilter};

pub use content::{Album, AlbumSummary, Artist, HealthStatus, NewPlaylist, Playlist, Track};

pub use playback::{PlayQueue, PlaybackSession, TransportState, parse_timed_lyrics};

pub use projection::{
    Page, PageLabel, ScreenContent, artist_tracks, attributed_tracks, page_labels,
};

pub use cache::FavoritesCache;

pub use sample::{sample_artists, sample_lyrics, sample_playlists, sample_tracks};

pub use api_client::{AcidwaveClient, CatalogApi, FavoriteAdded, GatewayResult, ListQuery};

pub use app_model::{AppModel, Screen, SelectedRow};
