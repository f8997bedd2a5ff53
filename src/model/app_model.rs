//! Main application model with state management

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use super::cache::FavoritesCache;
use super::content::{Album, Artist, Playlist, Track};
use super::playback::{LyricLine, PlayQueue, PlaybackSession, TransportState};
use super::projection::{
    ScreenContent, attributed_tracks, clamp_page, filtered_tracks, project_view, source_tracks,
};
use super::types::{
    Catalog, DetailView, Generations, InputMode, RequestKind, UiState, View, ViewFilter,
    ViewParams,
};

/// Seconds an error banner stays up
const ERROR_DISPLAY_SECS: u64 = 5;

/// Everything the view needs to draw the active screen
#[derive(Clone, Debug)]
pub struct Screen {
    pub view: View,
    pub params: ViewParams,
    pub content: ScreenContent,
    pub favorites: HashSet<String>,
    pub open_playlist: Option<Playlist>,
    pub playlists: Vec<Playlist>,
    pub using_sample: bool,
}

/// Main application model containing all state
pub struct AppModel {
    catalog: Arc<Mutex<Catalog>>,
    favorites: FavoritesCache,
    view_params: Arc<Mutex<HashMap<View, ViewParams>>>,
    playback: Arc<Mutex<PlaybackSession>>,
    pub ui_state: Arc<Mutex<UiState>>,
    generations: Arc<Mutex<Generations>>,
    pub should_quit: Arc<Mutex<bool>>,
    local_playlist_seq: Arc<Mutex<u64>>,
}

impl AppModel {
    pub fn new(favorites: FavoritesCache, volume: f64) -> Self {
        let playback = PlaybackSession {
            volume: volume.clamp(0.0, 1.0),
            ..PlaybackSession::default()
        };
        Self {
            catalog: Arc::new(Mutex::new(Catalog::default())),
            favorites,
            view_params: Arc::new(Mutex::new(HashMap::new())),
            playback: Arc::new(Mutex::new(playback)),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            generations: Arc::new(Mutex::new(Generations::default())),
            should_quit: Arc::new(Mutex::new(false)),
            local_playlist_seq: Arc::new(Mutex::new(0)),
        }
    }

    pub fn favorites(&self) -> FavoritesCache {
        self.favorites.clone()
    }

    // ========================================================================
    // Collections
    // ========================================================================

    pub async fn load_songs(&self, songs: Vec<Track>, using_sample: bool) {
        {
            let mut catalog = self.catalog.lock().await;
            tracing::debug!(count = songs.len(), using_sample, "Replacing songs collection");
            catalog.songs = songs;
            catalog.using_sample = using_sample;
        }
        self.clamp_pages().await;
    }

    pub async fn load_artists(&self, artists: Vec<Artist>) {
        self.catalog.lock().await.artists = artists;
        self.clamp_pages().await;
    }

    pub async fn load_playlists(&self, playlists: Vec<Playlist>) {
        self.catalog.lock().await.playlists = playlists;
        self.clamp_pages().await;
    }

    pub async fn get_catalog(&self) -> Catalog {
        self.catalog.lock().await.clone()
    }

    pub async fn song_count(&self) -> usize {
        self.catalog.lock().await.songs.len()
    }

    pub async fn using_sample(&self) -> bool {
        self.catalog.lock().await.using_sample
    }

    pub async fn find_track(&self, track_id: &str) -> Option<Track> {
        let catalog = self.catalog.lock().await;
        catalog
            .songs
            .iter()
            .chain(catalog.playlists.iter().flat_map(|p| p.entries.iter().map(|e| &e.track)))
            .find(|t| t.id == track_id)
            .cloned()
    }

    pub async fn find_playlist(&self, playlist_id: &str) -> Option<Playlist> {
        let catalog = self.catalog.lock().await;
        catalog.playlists.iter().find(|p| p.id == playlist_id).cloned()
    }

    /// Pulls every view's page back into range after a collection changed.
    async fn clamp_pages(&self) {
        let catalog = self.catalog.lock().await;
        let favorites = self.favorites.snapshot().await;
        let open_id = self.ui_state.lock().await.open_playlist.clone();
        let open = open_id
            .as_deref()
            .and_then(|id| catalog.playlists.iter().find(|p| p.id == id));

        let mut all_params = self.view_params.lock().await;
        for (view, params) in all_params.iter_mut() {
            let total_pages = project_view(&catalog, &favorites, *view, params, open).total_pages();
            let clamped = clamp_page(params.page, total_pages);
            if clamped != params.page {
                tracing::debug!(view = ?view, from = params.page, to = clamped, "Clamped page");
                params.page = clamped;
            }
        }
    }

    // ========================================================================
    // View parameters
    // ========================================================================

    pub async fn view_params(&self, view: View) -> ViewParams {
        self.view_params
            .lock()
            .await
            .get(&view)
            .cloned()
            .unwrap_or_default()
    }

    async fn update_params(&self, view: View, update: impl FnOnce(&mut ViewParams)) {
        {
            let mut all_params = self.view_params.lock().await;
            update(all_params.entry(view).or_default());
        }
        self.ui_state.lock().await.selected.insert(view, 0);
    }

    /// Changing the filter always returns the view to page 1
    pub async fn set_filter(&self, view: View, filter: ViewFilter) {
        self.update_params(view, |params| {
            params.filter = filter;
            params.page = 1;
        })
        .await;
    }

    pub async fn cycle_filter(&self, view: View) -> ViewFilter {
        let next = self.view_params(view).await.filter.cycle(view);
        self.set_filter(view, next.clone()).await;
        next
    }

    /// Changing the search text always returns the view to page 1
    pub async fn set_search_query(&self, view: View, text: String) {
        self.update_params(view, |params| {
            params.search = text;
            params.page = 1;
        })
        .await;
    }

    pub async fn append_to_search(&self, view: View, c: char) {
        let mut text = self.view_params(view).await.search;
        text.push(c);
        self.set_search_query(view, text).await;
    }

    pub async fn backspace_search(&self, view: View) {
        let mut text = self.view_params(view).await.search;
        text.pop();
        self.set_search_query(view, text).await;
    }

    /// Moves to `page`, clamped to the view's page range. Returns the page applied.
    pub async fn set_page(&self, view: View, page: usize) -> usize {
        let total_pages = self.project(view).await.total_pages();
        let page = clamp_page(page, total_pages);
        self.update_params(view, |params| params.page = page).await;
        page
    }

    pub async fn change_page(&self, view: View, forward: bool) -> usize {
        let current = self.view_params(view).await.page;
        let target = if forward {
            current + 1
        } else {
            current.saturating_sub(1)
        };
        self.set_page(view, target).await
    }

    // ========================================================================
    // Projections
    // ========================================================================

    async fn project(&self, view: View) -> ScreenContent {
        let params = self.view_params(view).await;
        let catalog = self.catalog.lock().await;
        let favorites = self.favorites.snapshot().await;
        let open_id = self.ui_state.lock().await.open_playlist.clone();
        let open = open_id
            .as_deref()
            .and_then(|id| catalog.playlists.iter().find(|p| p.id == id));
        project_view(&catalog, &favorites, view, &params, open)
    }

    pub async fn get_screen(&self) -> Screen {
        let view = self.ui_state.lock().await.active_view;
        let params = self.view_params(view).await;
        let content = self.project(view).await;
        let open_id = self.ui_state.lock().await.open_playlist.clone();
        let catalog = self.catalog.lock().await;

        Screen {
            view,
            params,
            content,
            favorites: self.favorites.snapshot().await,
            open_playlist: open_id
                .as_deref()
                .and_then(|id| catalog.playlists.iter().find(|p| p.id == id))
                .cloned(),
            playlists: catalog.playlists.clone(),
            using_sample: catalog.using_sample,
        }
    }

    /// The full filtered list behind `view`; becomes the play queue when a track starts there.
    pub async fn queue_for_view(&self, view: View) -> Vec<Track> {
        let params = self.view_params(view).await;
        let catalog = self.catalog.lock().await;
        let favorites = self.favorites.snapshot().await;
        let open_id = self.ui_state.lock().await.open_playlist.clone();
        let open = open_id
            .as_deref()
            .and_then(|id| catalog.playlists.iter().find(|p| p.id == id));
        filtered_tracks(&source_tracks(&catalog, &favorites, view, open), &params)
    }

    // ========================================================================
    // Navigation & selection
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn active_view(&self) -> View {
        self.ui_state.lock().await.active_view
    }

    pub async fn set_active_view(&self, view: View) {
        let mut state = self.ui_state.lock().await;
        state.active_view = view;
        state.detail = None;
        if view != View::PlaylistDetail {
            state.open_playlist = None;
        }
    }

    pub async fn selected_index(&self) -> usize {
        let state = self.ui_state.lock().await;
        state.selected_in(state.active_view)
    }

    pub async fn move_selection(&self, down: bool) {
        let view = self.active_view().await;
        let rows = self.project(view).await.row_count();
        let mut state = self.ui_state.lock().await;
        let current = state.selected_in(view);
        let next = if down {
            (current + 1).min(rows.saturating_sub(1))
        } else {
            current.saturating_sub(1)
        };
        state.selected.insert(view, next);
    }

    /// Row under the cursor on the current page of the active view
    pub async fn selected_row(&self) -> Option<SelectedRow> {
        let (view, index) = {
            let state = self.ui_state.lock().await;
            (state.active_view, state.selected_in(state.active_view))
        };
        match self.project(view).await {
            ScreenContent::Tracks(page) => page.items.get(index).cloned().map(SelectedRow::Track),
            ScreenContent::Artists(page) => page.items.get(index).cloned().map(SelectedRow::Artist),
            ScreenContent::Playlists(page) => {
                page.items.get(index).cloned().map(SelectedRow::Playlist)
            }
        }
    }

    pub async fn open_playlist_view(&self, playlist_id: String) {
        let mut state = self.ui_state.lock().await;
        state.open_playlist = Some(playlist_id);
        state.active_view = View::PlaylistDetail;
        state.detail = None;
        state.selected.insert(View::PlaylistDetail, 0);
        drop(state);
        self.update_params(View::PlaylistDetail, |params| *params = ViewParams::default())
            .await;
    }

    pub async fn open_playlist_id(&self) -> Option<String> {
        self.ui_state.lock().await.open_playlist.clone()
    }

    pub async fn set_input_mode(&self, mode: InputMode) {
        self.ui_state.lock().await.input_mode = mode;
    }

    pub async fn input_mode(&self) -> InputMode {
        self.ui_state.lock().await.input_mode.clone()
    }

    // ========================================================================
    // Detail overlays
    // ========================================================================

    pub async fn show_album_detail(&self, album: Album) {
        self.ui_state.lock().await.detail = Some(DetailView::Album {
            album,
            selected_index: 0,
        });
    }

    pub async fn show_artist_detail(&self, artist: Artist, refreshing: bool) {
        self.ui_state.lock().await.detail = Some(DetailView::Artist {
            artist,
            selected_index: 0,
            refreshing,
        });
    }

    /// Applies a refreshed artist if that artist's detail is still open.
    pub async fn update_artist_detail(&self, refreshed: Artist) -> bool {
        let mut state = self.ui_state.lock().await;
        match &mut state.detail {
            Some(DetailView::Artist { artist, refreshing, .. }) if artist.id == refreshed.id => {
                *artist = artist.merge_detail(refreshed);
                *refreshing = false;
                true
            }
            _ => false,
        }
    }

    /// Applies a fetched album if that album's detail is still open.
    /// An album without tracks keeps the listing built from loaded songs.
    pub async fn update_album_detail(&self, fetched: Album) -> bool {
        let mut state = self.ui_state.lock().await;
        match &mut state.detail {
            Some(DetailView::Album { album, selected_index }) if album.id == fetched.id => {
                let tracks = if fetched.tracks.is_empty() {
                    std::mem::take(&mut album.tracks)
                } else {
                    fetched.tracks
                };
                *album = Album { tracks, ..fetched };
                *selected_index = (*selected_index).min(album.tracks.len().saturating_sub(1));
                true
            }
            _ => false,
        }
    }

    pub async fn finish_artist_refresh(&self) {
        if let Some(DetailView::Artist { refreshing, .. }) = &mut self.ui_state.lock().await.detail {
            *refreshing = false;
        }
    }

    pub async fn get_detail(&self) -> Option<DetailView> {
        self.ui_state.lock().await.detail.clone()
    }

    /// Closes the detail overlay, returning what was open
    pub async fn close_detail(&self) -> Option<DetailView> {
        self.ui_state.lock().await.detail.take()
    }

    pub async fn move_detail_selection(&self, down: bool) {
        let songs = self.catalog.lock().await.songs.clone();
        let mut state = self.ui_state.lock().await;
        match &mut state.detail {
            Some(DetailView::Album { album, selected_index }) => {
                *selected_index = step(*selected_index, album.tracks.len(), down);
            }
            Some(DetailView::Artist { artist, selected_index, .. }) => {
                let rows = super::projection::artist_tracks(&songs, artist).len();
                *selected_index = step(*selected_index, rows, down);
            }
            None => {}
        }
    }

    // ========================================================================
    // Playlists (local, authoritative)
    // ========================================================================

    pub async fn next_local_playlist_id(&self) -> String {
        let mut seq = self.local_playlist_seq.lock().await;
        *seq += 1;
        format!("local-{}", *seq)
    }

    pub async fn add_playlist(&self, playlist: Playlist) {
        self.catalog.lock().await.playlists.push(playlist);
    }

    /// Removes a playlist; leaves the detail view if it was the one open.
    pub async fn remove_playlist(&self, playlist_id: &str) -> Option<Playlist> {
        let removed = {
            let mut catalog = self.catalog.lock().await;
            let index = catalog.playlists.iter().position(|p| p.id == playlist_id)?;
            catalog.playlists.remove(index)
        };

        {
            let mut state = self.ui_state.lock().await;
            if state.open_playlist.as_deref() == Some(playlist_id) {
                state.open_playlist = None;
                if state.active_view == View::PlaylistDetail {
                    state.active_view = View::Playlists;
                }
            }
        }
        self.clamp_pages().await;
        Some(removed)
    }

    /// Records the server id for a playlist created locally
    pub async fn set_playlist_remote_id(&self, playlist_id: &str, remote_id: String) {
        let mut catalog = self.catalog.lock().await;
        if let Some(playlist) = catalog.playlists.iter_mut().find(|p| p.id == playlist_id) {
            playlist.remote_id = Some(remote_id);
        }
    }

    /// Replaces a playlist's entries with a freshly fetched copy
    pub async fn set_playlist_entries(&self, playlist_id: &str, fetched: Playlist) {
        {
            let mut catalog = self.catalog.lock().await;
            if let Some(playlist) = catalog.playlists.iter_mut().find(|p| p.id == playlist_id) {
                // Tracks added locally before the fetch landed stay at the end
                let local_only: Vec<Track> = playlist
                    .entries
                    .iter()
                    .filter(|e| !fetched.contains(&e.track.id))
                    .map(|e| e.track.clone())
                    .collect();
                playlist.entries = fetched.entries;
                for track in local_only {
                    playlist.push_track(track);
                }
                playlist.entries_loaded = true;
                if playlist.description.is_none() {
                    playlist.description = fetched.description;
                }
            }
        }
        self.clamp_pages().await;
    }

    /// Appends a track. Returns the remote id (if any) and position used, or `None`
    /// when the playlist is gone or already holds the track.
    pub async fn add_track_to_playlist(
        &self,
        playlist_id: &str,
        track: Track,
    ) -> Option<(Option<String>, i64)> {
        let mut catalog = self.catalog.lock().await;
        let playlist = catalog.playlists.iter_mut().find(|p| p.id == playlist_id)?;
        if playlist.contains(&track.id) {
            return None;
        }
        let position = playlist.push_track(track);
        Some((playlist.remote_id.clone(), position))
    }

    /// Returns the playlist's remote id (if any) when a track was removed.
    pub async fn remove_track_from_playlist(
        &self,
        playlist_id: &str,
        track_id: &str,
    ) -> Option<Option<String>> {
        let removed = {
            let mut catalog = self.catalog.lock().await;
            let playlist = catalog.playlists.iter_mut().find(|p| p.id == playlist_id)?;
            if !playlist.remove_track(track_id) {
                return None;
            }
            playlist.remote_id.clone()
        };
        self.clamp_pages().await;
        Some(removed)
    }

    pub async fn playlist_count(&self) -> usize {
        self.catalog.lock().await.playlists.len()
    }

    pub async fn open_playlist_picker(&self, track_ids: Vec<String>) {
        let mut state = self.ui_state.lock().await;
        state.playlist_picker = Some(track_ids);
        state.picker_selected = 0;
    }

    /// Closes the picker, returning the pending tracks and the highlighted row
    pub async fn close_playlist_picker(&self) -> Option<(Vec<String>, usize)> {
        let mut state = self.ui_state.lock().await;
        let track_ids = state.playlist_picker.take()?;
        Some((track_ids, state.picker_selected))
    }

    pub async fn is_picker_open(&self) -> bool {
        self.ui_state.lock().await.playlist_picker.is_some()
    }

    pub async fn move_picker_selection(&self, down: bool) {
        let count = self.playlist_count().await;
        let mut state = self.ui_state.lock().await;
        state.picker_selected = step(state.picker_selected, count, down);
    }

    // ========================================================================
    // Licenses
    // ========================================================================

    pub async fn attributed_tracks(&self) -> Vec<Track> {
        attributed_tracks(&self.catalog.lock().await.songs)
    }

    pub async fn open_licenses(&self) {
        self.ui_state.lock().await.licenses = Some(0);
    }

    /// Returns whether the overlay was open
    pub async fn close_licenses(&self) -> bool {
        self.ui_state.lock().await.licenses.take().is_some()
    }

    pub async fn is_licenses_open(&self) -> bool {
        self.ui_state.lock().await.licenses.is_some()
    }

    pub async fn move_licenses_selection(&self, down: bool) {
        let count = self.attributed_tracks().await.len();
        let mut state = self.ui_state.lock().await;
        if let Some(selected) = state.licenses.as_mut() {
            *selected = step(*selected, count, down);
        }
    }

    // ========================================================================
    // Playback
    // ========================================================================

    pub async fn get_playback(&self) -> PlaybackSession {
        self.playback.lock().await.clone()
    }

    pub async fn load_track(&self, track: Track, queue: PlayQueue, lyrics: Vec<LyricLine>) {
        self.playback.lock().await.load(track, queue, lyrics);
    }

    /// Swaps in fetched lyrics if `track_id` is still the loaded track
    pub async fn replace_lyrics(&self, track_id: &str, lyrics: Vec<LyricLine>) -> bool {
        self.playback.lock().await.replace_lyrics(track_id, lyrics)
    }

    pub async fn set_transport(&self, state: TransportState) {
        let mut playback = self.playback.lock().await;
        if playback.track.is_some() {
            playback.state = state;
        }
    }

    /// Returns `true` when the highlighted lyric changed
    pub async fn update_position(&self, position: f64) -> bool {
        self.playback.lock().await.update_position(position)
    }

    pub async fn update_duration(&self, duration: f64) {
        self.playback.lock().await.update_duration(duration);
    }

    pub async fn set_volume(&self, volume: f64) -> f64 {
        let mut playback = self.playback.lock().await;
        playback.volume = volume.clamp(0.0, 1.0);
        playback.volume
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    pub async fn is_favorite(&self, track_id: &str) -> bool {
        self.favorites.contains(track_id).await
    }

    /// Hands the favorites set to another user; seeds still in flight for the
    /// previous user are dropped.
    pub async fn switch_favorites_user(&self, user_id: &str) -> anyhow::Result<()> {
        self.invalidate_requests(RequestKind::Favorites).await;
        let result = self.favorites.switch_user(user_id).await;
        self.clamp_pages().await;
        result
    }

    pub async fn seed_favorites(&self, track_ids: Vec<String>) {
        self.favorites.merge(track_ids).await;
        self.clamp_pages().await;
    }

    /// Flips a track's favorite state; unknown ids are rejected with `None`.
    pub async fn toggle_favorite(&self, track_id: &str) -> Option<bool> {
        self.find_track(track_id).await?;
        let now_favorite = self.favorites.toggle(track_id).await;
        self.clamp_pages().await;
        Some(now_favorite)
    }

    // ========================================================================
    // Requests
    // ========================================================================

    pub async fn begin_request(&self, kind: RequestKind) -> u64 {
        self.generations.lock().await.begin(kind)
    }

    pub async fn is_current_request(&self, kind: RequestKind, token: u64) -> bool {
        self.generations.lock().await.is_current(kind, token)
    }

    pub async fn invalidate_requests(&self, kind: RequestKind) {
        self.generations.lock().await.invalidate(kind);
    }

    pub async fn set_loading(&self, view: View, loading: bool) {
        self.ui_state.lock().await.loading.insert(view, loading);
    }

    pub async fn set_retry_available(&self, available: bool) {
        self.ui_state.lock().await.retry_available = available;
    }

    pub async fn retry_available(&self) -> bool {
        self.ui_state.lock().await.retry_available
    }

    pub async fn set_backend_online(&self, online: bool) {
        self.ui_state.lock().await.backend_online = Some(online);
    }

    // ========================================================================
    // Errors & lifecycle
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    /// Errors with a pending retry stay up until the retry clears them
    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if state.retry_available {
            return;
        }
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > ERROR_DISPLAY_SECS {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }
}

/// Row targeted by a key press in a list view
#[derive(Clone, Debug, PartialEq)]
pub enum SelectedRow {
    Track(Track),
    Artist(Artist),
    Playlist(Playlist),
}

fn step(current: usize, len: usize, down: bool) -> usize {
    if down {
        (current + 1).min(len.saturating_sub(1))
    } else {
        current.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample::{sample_artists, sample_tracks};

    fn model() -> AppModel {
        let dir = std::env::temp_dir().join(format!("acidwave-model-{}", std::process::id()));
        AppModel::new(FavoritesCache::in_dir(dir), 0.5)
    }

    async fn loaded_model() -> AppModel {
        let model = model();
        model.load_songs(sample_tracks(), true).await;
        model.load_artists(sample_artists()).await;
        model
    }

    #[tokio::test]
    async fn filter_change_resets_page() {
        let model = loaded_model().await;
        assert_eq!(model.set_page(View::Albums, 3).await, 3);

        model.cycle_filter(View::Albums).await;
        assert_eq!(model.view_params(View::Albums).await.page, 1);
    }

    #[tokio::test]
    async fn search_change_resets_page() {
        let model = loaded_model().await;
        model.set_page(View::Songs, 2).await;
        model.append_to_search(View::Songs, 'n').await;
        assert_eq!(model.view_params(View::Songs).await.page, 1);
        assert_eq!(model.view_params(View::Songs).await.search, "n");
    }

    #[tokio::test]
    async fn set_page_clamps_to_range() {
        let model = loaded_model().await;
        // 30 songs at 20 per page
        assert_eq!(model.set_page(View::Songs, 99).await, 2);
        assert_eq!(model.set_page(View::Songs, 0).await, 1);
    }

    #[tokio::test]
    async fn shrinking_collection_clamps_pages() {
        let model = loaded_model().await;
        model.set_page(View::Albums, 3).await;
        model.load_songs(sample_tracks().into_iter().take(5).collect(), false).await;
        assert_eq!(model.view_params(View::Albums).await.page, 1);
    }

    #[tokio::test]
    async fn toggle_favorite_rejects_unknown_ids() {
        let model = loaded_model().await;
        assert_eq!(model.toggle_favorite("nope").await, None);
        assert_eq!(model.toggle_favorite("1").await, Some(true));
        assert_eq!(model.toggle_favorite("1").await, Some(false));
    }

    #[tokio::test]
    async fn removing_open_playlist_leaves_detail_view() {
        let model = loaded_model().await;
        model.add_playlist(Playlist::local("local-1".into(), "MIX".into())).await;
        model.open_playlist_view("local-1".to_string()).await;
        assert_eq!(model.active_view().await, View::PlaylistDetail);

        assert!(model.remove_playlist("local-1").await.is_some());
        assert_eq!(model.active_view().await, View::Playlists);
        assert_eq!(model.open_playlist_id().await, None);
    }

    #[tokio::test]
    async fn queue_is_the_full_filtered_list() {
        let model = loaded_model().await;
        model
            .set_filter(View::Songs, ViewFilter::Genre("TECHNO".to_string()))
            .await;
        let queue = model.queue_for_view(View::Songs).await;
        assert!(!queue.is_empty());
        assert!(queue.iter().all(|t| t.genre == "TECHNO"));
    }

    #[tokio::test]
    async fn duplicate_track_is_not_added_twice() {
        let model = loaded_model().await;
        model.add_playlist(Playlist::local("local-1".into(), "MIX".into())).await;
        let track = sample_tracks().remove(0);
        assert_eq!(
            model.add_track_to_playlist("local-1", track.clone()).await,
            Some((None, 0))
        );
        assert_eq!(model.add_track_to_playlist("local-1", track).await, None);
    }

    #[tokio::test]
    async fn licenses_selection_stays_on_attributed_tracks() {
        let model = model();
        let mut songs = sample_tracks();
        for track in songs.iter_mut().take(3) {
            track.license.requires_attribution = true;
        }
        model.load_songs(songs, false).await;

        model.open_licenses().await;
        for _ in 0..10 {
            model.move_licenses_selection(true).await;
        }
        assert_eq!(model.get_ui_state().await.licenses, Some(2));
        assert!(model.close_licenses().await);
        assert!(!model.close_licenses().await);
    }

    #[tokio::test]
    async fn selection_stays_on_the_page() {
        let model = loaded_model().await;
        model.set_active_view(View::Artists).await;
        for _ in 0..50 {
            model.move_selection(true).await;
        }
        assert_eq!(model.selected_index().await, View::Artists.page_size() - 1);
    }
}
