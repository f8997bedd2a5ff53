//! Core type definitions for the application

use std::collections::HashMap;
use std::time::Instant;

use super::content::{Album, Artist, Playlist, Track};

/// Genres offered by the Songs view filter, in display order
pub const GENRES: [&str; 6] = ["GLITCH", "VAPOR", "CYBER", "TECHNO", "ACID", "AMBIENT"];

/// Top-level collection browsers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Songs,
    Albums,
    Artists,
    Favorites,
    Playlists,
    PlaylistDetail,
}

impl View {
    pub const BROWSABLE: [View; 5] = [
        View::Songs,
        View::Albums,
        View::Artists,
        View::Favorites,
        View::Playlists,
    ];

    pub fn page_size(self) -> usize {
        match self {
            View::Albums | View::Artists => 10,
            View::Songs | View::Favorites | View::PlaylistDetail | View::Playlists => 20,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Songs => "SONGS",
            View::Albums => "ALBUMS",
            View::Artists => "ARTISTS",
            View::Favorites => "FAVORITES",
            View::Playlists => "PLAYLISTS",
            View::PlaylistDetail => "PLAYLIST",
        }
    }

    pub fn next(self) -> Self {
        match self {
            View::Songs => View::Albums,
            View::Albums => View::Artists,
            View::Artists => View::Favorites,
            View::Favorites => View::Playlists,
            View::Playlists | View::PlaylistDetail => View::Songs,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            View::Songs => View::Playlists,
            View::Albums => View::Songs,
            View::Artists => View::Albums,
            View::Favorites => View::Artists,
            View::Playlists | View::PlaylistDetail => View::Favorites,
        }
    }
}

/// Canonical in-memory collections
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub songs: Vec<Track>,
    pub artists: Vec<Artist>,
    pub playlists: Vec<Playlist>,
    /// Songs are the bundled sample set rather than server rows
    pub using_sample: bool,
}

/// Categorical filter applied before search
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ViewFilter {
    #[default]
    All,
    /// Exact genre tag match
    Genre(String),
    /// Reverse load order
    RecentlyAdded,
    /// Fixed-size prefix of the collection
    RecentlyPlayed,
}

impl ViewFilter {
    pub fn label(&self) -> String {
        match self {
            ViewFilter::All => "ALL".to_string(),
            ViewFilter::Genre(genre) => genre.clone(),
            ViewFilter::RecentlyAdded => "RECENTLY_ADDED".to_string(),
            ViewFilter::RecentlyPlayed => "RECENTLY_PLAYED".to_string(),
        }
    }

    /// Next filter in the cycle offered by `view`
    pub fn cycle(&self, view: View) -> ViewFilter {
        match view {
            View::Songs => {
                let next_genre = match self {
                    ViewFilter::Genre(current) => GENRES
                        .iter()
                        .position(|g| g == current)
                        .and_then(|i| GENRES.get(i + 1)),
                    _ => GENRES.first(),
                };
                next_genre
                    .map(|g| ViewFilter::Genre(g.to_string()))
                    .unwrap_or(ViewFilter::All)
            }
            View::Albums => match self {
                ViewFilter::All => ViewFilter::RecentlyPlayed,
                ViewFilter::RecentlyPlayed => ViewFilter::RecentlyAdded,
                _ => ViewFilter::All,
            },
            _ => ViewFilter::All,
        }
    }
}

/// Filter, search text and page for one view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewParams {
    pub filter: ViewFilter,
    pub search: String,
    /// 1-based
    pub page: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            filter: ViewFilter::All,
            search: String::new(),
            page: 1,
        }
    }
}

/// Asynchronous request families guarded by generation tokens
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Songs,
    Artists,
    ArtistDetail,
    AlbumDetail,
    Playlists,
    PlaylistDetail,
    Favorites,
}

/// Monotonic counters used to discard stale responses
#[derive(Clone, Debug, Default)]
pub struct Generations {
    counters: HashMap<RequestKind, u64>,
}

impl Generations {
    /// Starts a new request, superseding any in flight
    pub fn begin(&mut self, kind: RequestKind) -> u64 {
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        *counter
    }

    pub fn is_current(&self, kind: RequestKind, token: u64) -> bool {
        self.counters.get(&kind).copied().unwrap_or(0) == token
    }

    /// Drops whatever is in flight without starting anything new
    pub fn invalidate(&mut self, kind: RequestKind) {
        self.begin(kind);
    }
}

/// Detail overlay shown above the active view
#[derive(Clone, Debug, PartialEq)]
pub enum DetailView {
    Album { album: Album, selected_index: usize },
    Artist { artist: Artist, selected_index: usize, refreshing: bool },
}

/// Text input currently capturing keys
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    PlaylistName(String),
    Username(String),
}

/// UI state for the application
#[derive(Clone, Debug)]
pub struct UiState {
    pub active_view: View,
    pub selected: HashMap<View, usize>,
    pub input_mode: InputMode,
    pub detail: Option<DetailView>,
    /// Playlist open in the detail view (client key)
    pub open_playlist: Option<String>,
    /// Tracks waiting for a target playlist in the picker
    pub playlist_picker: Option<Vec<String>>,
    pub picker_selected: usize,
    /// Highlighted row of the licenses overlay while it is open
    pub licenses: Option<usize>,
    pub loading: HashMap<View, bool>,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    /// Primary load failed and `r` retries it
    pub retry_available: bool,
    pub backend_online: Option<bool>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_view: View::Albums,
            selected: HashMap::new(),
            input_mode: InputMode::Normal,
            detail: None,
            open_playlist: None,
            playlist_picker: None,
            picker_selected: 0,
            licenses: None,
            loading: HashMap::new(),
            error_message: None,
            error_timestamp: None,
            retry_available: false,
            backend_online: None,
        }
    }
}

impl UiState {
    pub fn selected_in(&self, view: View) -> usize {
        self.selected.get(&view).copied().unwrap_or(0)
    }

    pub fn is_loading(&self, view: View) -> bool {
        self.loading.get(&view).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_filter_cycles_through_genres_and_back() {
        let mut filter = ViewFilter::All;
        let mut seen = Vec::new();
        for _ in 0..GENRES.len() {
            filter = filter.cycle(View::Songs);
            seen.push(filter.label());
        }
        assert_eq!(seen, GENRES);
        assert_eq!(filter.cycle(View::Songs), ViewFilter::All);
    }

    #[test]
    fn album_filter_cycles_presets() {
        let filter = ViewFilter::All.cycle(View::Albums);
        assert_eq!(filter, ViewFilter::RecentlyPlayed);
        let filter = filter.cycle(View::Albums);
        assert_eq!(filter, ViewFilter::RecentlyAdded);
        assert_eq!(filter.cycle(View::Albums), ViewFilter::All);
    }

    #[test]
    fn generation_tokens_supersede_each_other() {
        let mut generations = Generations::default();
        let first = generations.begin(RequestKind::ArtistDetail);
        let second = generations.begin(RequestKind::ArtistDetail);
        assert!(!generations.is_current(RequestKind::ArtistDetail, first));
        assert!(generations.is_current(RequestKind::ArtistDetail, second));

        generations.invalidate(RequestKind::ArtistDetail);
        assert!(!generations.is_current(RequestKind::ArtistDetail, second));
        // Other families are independent
        let songs = generations.begin(RequestKind::Songs);
        assert!(generations.is_current(RequestKind::Songs, songs));
    }
}
