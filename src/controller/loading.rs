//! Catalog loading: primary songs load with sample fallback, secondary loads,
//! and generation-guarded detail refreshes

use crate::model::{
    Album, AlbumSummary, Artist, ListQuery, Playlist, RequestKind, Track, View, sample_artists,
    sample_playlists, sample_tracks,
};

use super::AppController;

impl AppController {
    /// Startup sequence: the session user's cached favorites, songs, then
    /// everything else concurrently
    pub async fn initialize(&self) {
        self.switch_favorites().await;

        self.load_catalog().await;
        futures::join!(
            self.load_artists(),
            self.load_playlists(),
            self.load_favorites(),
            self.check_health(),
        );
    }

    /// Primary load. Failure or an empty catalog falls back to the bundled samples
    /// so no view is ever empty; failure also offers a retry.
    pub async fn load_catalog(&self) {
        let token = {
            let model = self.model.lock().await;
            model.set_loading(View::Songs, true).await;
            model.set_loading(View::Albums, true).await;
            model.begin_request(RequestKind::Songs).await
        };

        let query = ListQuery::limit(self.config.song_fetch_limit);
        let result = self.api.list_songs(&query).await;

        let model = self.model.lock().await;
        if !model.is_current_request(RequestKind::Songs, token).await {
            tracing::debug!(token, "Discarding stale songs response");
            return;
        }

        match result {
            Ok(songs) if !songs.is_empty() => {
                tracing::info!(count = songs.len(), "Loaded songs from backend");
                model.load_songs(songs, false).await;
                model.set_retry_available(false).await;
                model.set_backend_online(true).await;
            }
            Ok(_) => {
                tracing::info!("Backend returned no songs, using sample catalog");
                model.load_songs(sample_tracks(), true).await;
                model.set_retry_available(false).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load songs, using sample catalog");
                let message = Self::format_error(&anyhow::Error::from(e));
                model.load_songs(sample_tracks(), true).await;
                model.set_retry_available(true).await;
                model.set_backend_online(false).await;
                model.set_error(format!("{message} Showing sample catalog, press r to retry.")).await;
            }
        }
        model.set_loading(View::Songs, false).await;
        model.set_loading(View::Albums, false).await;
    }

    pub async fn retry_catalog(&self) {
        {
            let model = self.model.lock().await;
            if !model.retry_available().await {
                return;
            }
            model.set_retry_available(false).await;
            model.clear_error().await;
        }
        tracing::info!("Retrying catalog load");
        self.load_catalog().await;
        futures::join!(self.load_artists(), self.load_playlists(), self.load_favorites());
    }

    /// Secondary load; failures keep the last known artists, or the samples when there are none.
    pub async fn load_artists(&self) {
        let token = {
            let model = self.model.lock().await;
            model.set_loading(View::Artists, true).await;
            model.begin_request(RequestKind::Artists).await
        };

        let query = ListQuery {
            include_albums: true,
            ..ListQuery::limit(self.config.artist_fetch_limit)
        };
        let result = self.api.list_artists(&query).await;

        let model = self.model.lock().await;
        if !model.is_current_request(RequestKind::Artists, token).await {
            return;
        }
        match result {
            Ok(artists) if !artists.is_empty() => {
                tracing::info!(count = artists.len(), "Loaded artists");
                model.load_artists(artists).await;
            }
            other => {
                if let Err(e) = &other {
                    tracing::warn!(error = %e, "Failed to load artists");
                }
                if model.get_catalog().await.artists.is_empty() {
                    model.load_artists(sample_artists()).await;
                }
            }
        }
        model.set_loading(View::Artists, false).await;
    }

    /// Secondary load. Playlists created locally and not yet on the server survive a reload.
    pub async fn load_playlists(&self) {
        let token = {
            let model = self.model.lock().await;
            model.set_loading(View::Playlists, true).await;
            model.begin_request(RequestKind::Playlists).await
        };

        let result = self.api.list_playlists().await;

        let model = self.model.lock().await;
        if !model.is_current_request(RequestKind::Playlists, token).await {
            return;
        }
        let current = model.get_catalog().await.playlists;
        match result {
            Ok(mut playlists) => {
                tracing::info!(count = playlists.len(), "Loaded playlists");
                playlists.extend(current.into_iter().filter(|p| p.remote_id.is_none()));
                model.load_playlists(playlists).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load playlists");
                if current.is_empty() {
                    model.load_playlists(sample_playlists()).await;
                }
            }
        }
        model.set_loading(View::Playlists, false).await;
    }

    /// Seeds the local favorites set from the server table for the current user
    pub async fn load_favorites(&self) {
        let user_id = self.user_id().await;
        let token = self.model.lock().await.begin_request(RequestKind::Favorites).await;

        match self.api.list_favorites(&user_id).await {
            Ok(ids) => {
                let model = self.model.lock().await;
                if !model.is_current_request(RequestKind::Favorites, token).await {
                    return;
                }
                tracing::info!(count = ids.len(), user_id = %user_id, "Seeded favorites from server");
                model.seed_favorites(ids).await;
                let favorites = model.favorites();
                drop(model);
                if let Err(e) = favorites.save_to_disk().await {
                    tracing::warn!(error = %e, "Could not persist favorites");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load server favorites"),
        }
    }

    pub async fn check_health(&self) {
        let online = match self.api.health().await {
            Ok(health) => {
                tracing::info!(
                    status = %health.status,
                    database = health.database.connected,
                    songs = health.database.songs_count,
                    "Backend health"
                );
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Backend health check failed");
                false
            }
        };
        self.model.lock().await.set_backend_online(online).await;
    }

    /// Shows the artist at once from list data and refreshes it in the background.
    /// Leaving the detail or opening another artist discards the refresh.
    pub async fn open_artist(&self, artist: Artist) {
        let token = {
            let model = self.model.lock().await;
            model.show_artist_detail(artist.clone(), true).await;
            model.begin_request(RequestKind::ArtistDetail).await
        };

        let controller = self.clone();
        tokio::spawn(async move {
            controller.refresh_artist(artist.id, token).await;
        });
    }

    /// Fetches the artist with its songs and albums. The extra listings only
    /// fill what the artist record itself left empty.
    pub(crate) async fn refresh_artist(&self, artist_id: String, token: u64) {
        let (result, songs, albums) = futures::join!(
            self.api.get_artist(&artist_id),
            self.api.artist_songs(&artist_id),
            self.api.artist_albums(&artist_id),
        );

        let model = self.model.lock().await;
        if !model.is_current_request(RequestKind::ArtistDetail, token).await {
            tracing::debug!(artist_id, token, "Discarding stale artist detail");
            return;
        }
        match result {
            Ok(mut detail) => {
                match songs {
                    Ok(songs) if detail.top_tracks.is_empty() => detail.top_tracks = songs,
                    Ok(_) => {}
                    Err(e) => tracing::debug!(artist_id, error = %e, "No artist songs listing"),
                }
                match albums {
                    Ok(albums) if detail.albums.is_empty() => {
                        detail.albums = albums.iter().map(AlbumSummary::from).collect();
                    }
                    Ok(_) => {}
                    Err(e) => tracing::debug!(artist_id, error = %e, "No artist albums listing"),
                }
                model.update_artist_detail(detail).await;
            }
            Err(e) => {
                tracing::warn!(artist_id, error = %e, "Artist refresh failed, keeping list data");
                model.finish_artist_refresh().await;
            }
        }
    }

    /// Shows the album built from loaded songs, then fetches the server copy
    /// when the track carries an album id.
    pub async fn open_album(&self, track: &Track) {
        let (token, using_sample) = {
            let model = self.model.lock().await;
            let songs = model.get_catalog().await.songs;
            let album = Album::from_track(&songs, track);
            tracing::debug!(album = %album.title, tracks = album.tracks.len(), "Opening album");
            model.show_album_detail(album).await;
            (
                model.begin_request(RequestKind::AlbumDetail).await,
                model.using_sample().await,
            )
        };

        let Some(album_id) = track.album_id.clone() else {
            return;
        };
        if using_sample {
            return;
        }
        let controller = self.clone();
        tokio::spawn(async move {
            controller.refresh_album(album_id, token).await;
        });
    }

    /// Album record first; the tracks endpoint covers records without a listing.
    pub(crate) async fn refresh_album(&self, album_id: String, token: u64) {
        let album = match self.api.get_album(&album_id).await {
            Ok(album) if album.tracks.is_empty() => match self.api.album_tracks(&album_id).await {
                Ok(tracks) => album.with_tracks(tracks),
                Err(e) => {
                    tracing::debug!(album_id, error = %e, "No album tracks listing");
                    album
                }
            },
            Ok(album) => album,
            Err(e) => {
                tracing::warn!(album_id, error = %e, "Album refresh failed, keeping local listing");
                return;
            }
        };

        let model = self.model.lock().await;
        if !model.is_current_request(RequestKind::AlbumDetail, token).await {
            tracing::debug!(album_id, token, "Discarding stale album detail");
            return;
        }
        model.update_album_detail(album).await;
    }

    /// Opens a playlist's detail view, fetching its tracks when it lives on the server.
    pub async fn open_playlist(&self, playlist: Playlist) {
        let token = {
            let model = self.model.lock().await;
            model.open_playlist_view(playlist.id.clone()).await;
            model.begin_request(RequestKind::PlaylistDetail).await
        };

        let Some(remote_id) = playlist.remote_id.clone() else {
            return;
        };
        self.model.lock().await.set_loading(View::PlaylistDetail, true).await;

        let controller = self.clone();
        tokio::spawn(async move {
            controller.refresh_playlist(playlist.id, remote_id, token).await;
        });
    }

    pub(crate) async fn refresh_playlist(&self, playlist_id: String, remote_id: String, token: u64) {
        let result = self.api.get_playlist(&remote_id).await;

        let model = self.model.lock().await;
        model.set_loading(View::PlaylistDetail, false).await;
        if !model.is_current_request(RequestKind::PlaylistDetail, token).await {
            tracing::debug!(playlist_id, token, "Discarding stale playlist detail");
            return;
        }
        match result {
            Ok(fetched) => model.set_playlist_entries(&playlist_id, fetched).await,
            Err(e) => tracing::warn!(playlist_id, error = %e, "Failed to load playlist tracks"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::super::test_support::{FakeApi, controller_with, loaded_controller};
    use crate::model::{Album, DetailView, RequestKind, View, sample_artists, sample_tracks};

    fn album_with_id(track: &crate::model::Track, id: &str) -> Album {
        Album {
            id: id.to_string(),
            title: "ART ANGELS (DELUXE)".to_string(),
            ..Album::from_track(&[], track)
        }
    }

    #[tokio::test]
    async fn failed_primary_load_falls_back_and_offers_retry() {
        let api = Arc::new(FakeApi::failing());
        let controller = controller_with(api.clone());
        controller.load_catalog().await;

        let model = controller.model.lock().await;
        assert!(model.using_sample().await);
        assert_eq!(model.song_count().await, 30);
        assert!(model.retry_available().await);
        assert!(model.get_ui_state().await.error_message.is_some());
    }

    #[tokio::test]
    async fn stale_songs_response_is_discarded() {
        let api = Arc::new(FakeApi::slow(50));
        let controller = controller_with(api.clone());

        let first = controller.clone();
        let slow_load = tokio::spawn(async move { first.load_catalog().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        api.lag_ms.store(0, Ordering::SeqCst);
        *api.songs.lock().expect("songs lock") = sample_tracks().into_iter().take(2).collect();
        controller.load_catalog().await;
        slow_load.await.expect("first load");

        let model = controller.model.lock().await;
        assert_eq!(model.song_count().await, 2);
        assert!(!model.using_sample().await);
        assert!(!model.get_ui_state().await.is_loading(View::Songs));
    }

    #[tokio::test]
    async fn empty_catalog_uses_samples_without_error() {
        let api = Arc::new(FakeApi::default());
        let controller = controller_with(api);
        controller.load_catalog().await;

        let model = controller.model.lock().await;
        assert!(model.using_sample().await);
        assert!(!model.retry_available().await);
        assert!(model.get_ui_state().await.error_message.is_none());
    }

    #[tokio::test]
    async fn retry_reloads_once_backend_recovers() {
        let api = Arc::new(FakeApi::failing());
        let controller = controller_with(api.clone());
        controller.load_catalog().await;

        api.failing.store(false, std::sync::atomic::Ordering::SeqCst);
        *api.songs.lock().expect("songs lock") =
            crate::model::sample_tracks().into_iter().take(4).collect();
        controller.retry_catalog().await;

        let model = controller.model.lock().await;
        assert!(!model.using_sample().await);
        assert_eq!(model.song_count().await, 4);
        assert!(!model.retry_available().await);
    }

    #[tokio::test]
    async fn failed_secondary_loads_fall_back_to_samples() {
        let api = Arc::new(FakeApi::failing());
        let controller = controller_with(api);
        controller.load_artists().await;
        controller.load_playlists().await;

        let catalog = controller.model.lock().await.get_catalog().await;
        assert_eq!(catalog.artists.len(), sample_artists().len());
        assert_eq!(catalog.playlists.len(), 4);
    }

    #[tokio::test]
    async fn stale_artist_refresh_is_discarded() {
        let api = Arc::new(FakeApi::with_catalog());
        let controller = loaded_controller(api).await;
        let artists = sample_artists();

        let stale_token = {
            let model = controller.model.lock().await;
            model.show_artist_detail(artists[0].clone(), true).await;
            model.begin_request(crate::model::RequestKind::ArtistDetail).await
        };
        // A second artist opened before the first refresh landed
        let fresh_token = {
            let model = controller.model.lock().await;
            model.show_artist_detail(artists[1].clone(), true).await;
            model.begin_request(crate::model::RequestKind::ArtistDetail).await
        };

        controller.refresh_artist(artists[0].id.clone(), stale_token).await;
        let detail = controller.model.lock().await.get_detail().await;
        assert!(matches!(
            detail,
            Some(DetailView::Artist { ref artist, refreshing: true, .. }) if artist.id == artists[1].id
        ));

        controller.refresh_artist(artists[1].id.clone(), fresh_token).await;
        let detail = controller.model.lock().await.get_detail().await;
        assert!(matches!(detail, Some(DetailView::Artist { refreshing: false, .. })));
    }

    #[tokio::test]
    async fn locally_created_playlists_survive_reload() {
        let api = Arc::new(FakeApi::failing());
        let controller = loaded_controller(api.clone()).await;
        let mirror = controller.create_playlist("offline mix").await.expect("accepted");
        mirror.await.expect("mirror task");

        api.failing.store(false, std::sync::atomic::Ordering::SeqCst);
        controller.load_playlists().await;

        let playlists = controller.model.lock().await.get_catalog().await.playlists;
        assert!(playlists.iter().any(|p| p.name == "OFFLINE_MIX"));
    }

    #[tokio::test]
    async fn artist_refresh_fills_songs_and_albums() {
        let api = Arc::new(FakeApi::with_catalog());
        let artist = sample_artists().remove(0);
        let mut own_track = sample_tracks().remove(0);
        own_track.artist_id = Some(artist.id.clone());
        *api.songs.lock().expect("songs lock") = vec![own_track.clone()];
        *api.albums.lock().expect("albums lock") = vec![album_with_id(&own_track, "al-1")];
        let controller = loaded_controller(api).await;

        let token = {
            let model = controller.model.lock().await;
            model.show_artist_detail(artist.clone(), true).await;
            model.begin_request(RequestKind::ArtistDetail).await
        };
        controller.refresh_artist(artist.id.clone(), token).await;

        let detail = controller.model.lock().await.get_detail().await;
        let Some(DetailView::Artist { artist: refreshed, .. }) = detail else {
            panic!("artist detail closed");
        };
        assert_eq!(refreshed.top_tracks, vec![own_track]);
        assert_eq!(refreshed.albums.len(), 1);
        assert_eq!(refreshed.albums[0].id, "al-1");
        assert_eq!(refreshed.album_count, 1);
    }

    #[tokio::test]
    async fn album_refresh_falls_back_to_track_listing() {
        let api = Arc::new(FakeApi::default());
        let mut tracks: Vec<_> = sample_tracks().into_iter().take(2).collect();
        for track in &mut tracks {
            track.album_id = Some("al-9".to_string());
        }
        let mut album = album_with_id(&tracks[0], "al-9");
        album.tracks.clear();
        *api.songs.lock().expect("songs lock") = tracks.clone();
        *api.albums.lock().expect("albums lock") = vec![album];
        let controller = loaded_controller(api.clone()).await;

        let token = {
            let model = controller.model.lock().await;
            model.show_album_detail(Album::from_track(&tracks, &tracks[0])).await;
            model.begin_request(RequestKind::AlbumDetail).await
        };
        controller.refresh_album("al-9".to_string(), token).await;

        assert_eq!(api.calls_to("album_tracks al-9"), 1);
        let detail = controller.model.lock().await.get_detail().await;
        let Some(DetailView::Album { album, .. }) = detail else {
            panic!("album detail closed");
        };
        assert_eq!(album.title, "ART ANGELS (DELUXE)");
        assert_eq!(album.tracks.len(), 2);
        assert_eq!(album.tracks[1].track_number, 2);
    }

    #[tokio::test]
    async fn closed_album_ignores_late_refresh() {
        let api = Arc::new(FakeApi::default());
        let mut track = sample_tracks().remove(0);
        track.album_id = Some("al-2".to_string());
        *api.albums.lock().expect("albums lock") = vec![album_with_id(&track, "al-2")];
        let controller = loaded_controller(api).await;

        let token = {
            let model = controller.model.lock().await;
            model.show_album_detail(Album::from_track(&[track.clone()], &track)).await;
            model.begin_request(RequestKind::AlbumDetail).await
        };
        controller.go_back().await;
        controller.refresh_album("al-2".to_string(), token).await;

        assert!(controller.model.lock().await.get_detail().await.is_none());
    }
}

