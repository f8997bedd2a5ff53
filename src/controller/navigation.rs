//! Navigation-related controller methods (views, filters, search, details, favorites)

use crate::model::{
    DetailView, InputMode, RequestKind, SelectedRow, Track, View, artist_tracks,
};

use super::AppController;
use super::mirror::MirrorHandle;

impl AppController {
    pub async fn switch_view(&self, view: View) {
        self.leave_details().await;
        let model = self.model.lock().await;
        if model.active_view().await == View::PlaylistDetail && view != View::PlaylistDetail {
            model.invalidate_requests(RequestKind::PlaylistDetail).await;
        }
        model.set_active_view(view).await;
        tracing::debug!(view = ?view, "Switched view");
    }

    /// Closes an open album or artist overlay, dropping its in-flight refresh
    async fn leave_details(&self) -> bool {
        let model = self.model.lock().await;
        match model.close_detail().await {
            Some(DetailView::Artist { .. }) => {
                model.invalidate_requests(RequestKind::ArtistDetail).await;
                true
            }
            Some(DetailView::Album { .. }) => {
                model.invalidate_requests(RequestKind::AlbumDetail).await;
                true
            }
            None => false,
        }
    }

    /// Esc: licenses or picker, then detail overlay, then playlist detail, then search text
    pub async fn go_back(&self) {
        if self.model.lock().await.close_licenses().await {
            return;
        }
        if self.model.lock().await.close_playlist_picker().await.is_some() {
            return;
        }
        if self.leave_details().await {
            return;
        }
        let view = self.model.lock().await.active_view().await;
        if view == View::PlaylistDetail {
            self.switch_view(View::Playlists).await;
            return;
        }
        let model = self.model.lock().await;
        if !model.view_params(view).await.search.is_empty() {
            model.set_search_query(view, String::new()).await;
        }
    }

    /// Opens the attribution list, or closes it when already open
    pub async fn toggle_licenses(&self) {
        let model = self.model.lock().await;
        if model.close_licenses().await {
            return;
        }
        let count = model.attributed_tracks().await.len();
        model.open_licenses().await;
        tracing::debug!(count, "Licenses opened");
    }

    pub async fn cycle_filter(&self) {
        let model = self.model.lock().await;
        let view = model.active_view().await;
        let filter = model.cycle_filter(view).await;
        tracing::debug!(view = ?view, filter = %filter.label(), "Filter changed");
    }

    pub async fn start_search(&self) {
        self.model.lock().await.set_input_mode(InputMode::Search).await;
    }

    pub async fn search_input(&self, c: char) {
        let model = self.model.lock().await;
        let view = model.active_view().await;
        model.append_to_search(view, c).await;
    }

    pub async fn search_backspace(&self) {
        let model = self.model.lock().await;
        let view = model.active_view().await;
        model.backspace_search(view).await;
    }

    pub async fn change_page(&self, forward: bool) {
        let model = self.model.lock().await;
        let view = model.active_view().await;
        let page = model.change_page(view, forward).await;
        tracing::trace!(view = ?view, page, "Page changed");
    }

    pub async fn move_selection(&self, down: bool) {
        let model = self.model.lock().await;
        if model.is_licenses_open().await {
            model.move_licenses_selection(down).await;
        } else if model.is_picker_open().await {
            model.move_picker_selection(down).await;
        } else if model.get_detail().await.is_some() {
            model.move_detail_selection(down).await;
        } else {
            model.move_selection(down).await;
        }
    }

    /// The track under the cursor and the list it belongs to
    pub(crate) async fn target_track(&self) -> Option<(Track, Vec<Track>)> {
        let model = self.model.lock().await;
        match model.get_detail().await {
            Some(DetailView::Album { album, selected_index }) => {
                let tracks: Vec<Track> = album.tracks.into_iter().map(|t| t.track).collect();
                tracks.get(selected_index).cloned().map(|t| (t, tracks))
            }
            Some(DetailView::Artist { artist, selected_index, .. }) => {
                let songs = model.get_catalog().await.songs;
                let tracks = artist_tracks(&songs, &artist);
                tracks.get(selected_index).cloned().map(|t| (t, tracks))
            }
            None => match model.selected_row().await {
                Some(SelectedRow::Track(track)) => {
                    let view = model.active_view().await;
                    Some((track, model.queue_for_view(view).await))
                }
                _ => None,
            },
        }
    }

    pub async fn play_selected(&self) {
        if let Some((track, queue)) = self.target_track().await {
            self.play_track(track, queue).await;
        }
    }

    /// Enter: play a track, or open the album, artist or playlist under the cursor
    pub async fn activate_selected(&self) {
        let (detail, view, row) = {
            let model = self.model.lock().await;
            (model.get_detail().await, model.active_view().await, model.selected_row().await)
        };

        if detail.is_some() {
            self.play_selected().await;
            return;
        }

        match (view, row) {
            (View::Albums, Some(SelectedRow::Track(track))) => self.open_album(&track).await,
            (_, Some(SelectedRow::Track(_))) => self.play_selected().await,
            (_, Some(SelectedRow::Artist(artist))) => self.open_artist(artist).await,
            (_, Some(SelectedRow::Playlist(playlist))) => self.open_playlist(playlist).await,
            (_, None) => {}
        }
    }

    /// Flips the favorite state of the track under the cursor
    pub async fn toggle_favorite_selected(&self) -> Option<MirrorHandle> {
        let (track, _) = self.target_track().await?;
        self.toggle_favorite(&track.id).await
    }

    /// Local set first (and persisted), then mirrored to the server favorites table
    pub async fn toggle_favorite(&self, track_id: &str) -> Option<MirrorHandle> {
        let model = self.model.lock().await;
        let Some(now_favorite) = model.toggle_favorite(track_id).await else {
            model.set_error("Cannot favorite a track that is not in the catalog".to_string()).await;
            return None;
        };
        let favorites = model.favorites();
        drop(model);
        tracing::info!(track_id, favorite = now_favorite, "Toggled favorite");

        if let Err(e) = favorites.save_to_disk().await {
            tracing::warn!(error = %e, "Could not persist favorites");
        }

        let api = self.api.clone();
        let user_id = self.user_id().await;
        let song_id = track_id.to_string();
        Some(self.mirror("toggle_favorite", async move {
            if now_favorite {
                if api.check_favorite(&song_id, &user_id).await? {
                    return Ok(());
                }
                api.add_favorite(&song_id, &user_id).await.map(|_| ())
            } else {
                api.remove_favorite(&song_id, &user_id).await
            }
        }))
    }

    /// Opens the playlist picker for the selected track, or the whole album when `whole_album`
    pub async fn pick_playlist_for_selection(&self, whole_album: bool) {
        let detail = self.model.lock().await.get_detail().await;
        let track_ids: Vec<String> = match (whole_album, detail) {
            (true, Some(DetailView::Album { album, .. })) => {
                album.tracks.iter().map(|t| t.track.id.clone()).collect()
            }
            _ => match self.target_track().await {
                Some((track, _)) => vec![track.id],
                None => return,
            },
        };

        let model = self.model.lock().await;
        if model.playlist_count().await == 0 {
            model.set_error("No playlists yet. Press c to create one.".to_string()).await;
            return;
        }
        model.open_playlist_picker(track_ids).await;
    }

    /// Adds the picker's pending tracks to the highlighted playlist
    pub async fn confirm_playlist_picker(&self) {
        let (track_ids, selected) = {
            let model = self.model.lock().await;
            let Some(pending) = model.close_playlist_picker().await else {
                return;
            };
            pending
        };
        let Some(playlist) = self.model.lock().await.get_catalog().await.playlists.get(selected).cloned()
        else {
            return;
        };

        let tracks: Vec<Track> = {
            let model = self.model.lock().await;
            let mut tracks = Vec::with_capacity(track_ids.len());
            for id in &track_ids {
                if let Some(track) = model.find_track(id).await {
                    tracks.push(track);
                }
            }
            tracks
        };
        let added = self.add_tracks_to_playlist(&playlist.id, &tracks).await;
        tracing::debug!(playlist_id = %playlist.id, added, "Picker applied");
    }

    /// `x`: remove the selected track from the open playlist, or delete the selected playlist
    pub async fn remove_selected(&self) {
        let (view, row, open_playlist) = {
            let model = self.model.lock().await;
            if model.get_detail().await.is_some() {
                return;
            }
            (
                model.active_view().await,
                model.selected_row().await,
                model.open_playlist_id().await,
            )
        };

        match (view, row, open_playlist) {
            (View::PlaylistDetail, Some(SelectedRow::Track(track)), Some(playlist_id)) => {
                self.remove_track_from_playlist(&playlist_id, &track.id).await;
            }
            (View::Playlists, Some(SelectedRow::Playlist(playlist)), _) => {
                self.delete_playlist(&playlist.id).await;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::test_support::{FakeApi, loaded_controller};
    use super::*;
    use crate::model::ViewFilter;

    #[tokio::test]
    async fn enter_on_albums_opens_derived_album() {
        let controller = loaded_controller(Arc::new(FakeApi::default())).await;
        controller.switch_view(View::Albums).await;
        controller.activate_selected().await;

        let detail = controller.model.lock().await.get_detail().await;
        let Some(DetailView::Album { album, .. }) = detail else {
            panic!("album detail expected");
        };
        assert_eq!(album.title, "ART ANGELS");
        assert_eq!(album.tracks[0].track_number, 1);
    }

    #[tokio::test]
    async fn playing_from_a_filtered_view_queues_that_filter() {
        let controller = loaded_controller(Arc::new(FakeApi::default())).await;
        controller.switch_view(View::Songs).await;
        controller
            .model
            .lock()
            .await
            .set_filter(View::Songs, ViewFilter::Genre("AMBIENT".to_string()))
            .await;
        controller.activate_selected().await;

        let playback = controller.model.lock().await.get_playback().await;
        assert!(playback.is_playing());
        assert!(!playback.queue.is_empty());
        assert!(playback.queue.tracks.iter().all(|t| t.genre == "AMBIENT"));
    }

    #[tokio::test]
    async fn favorite_toggle_is_mirrored_and_double_toggle_restores() {
        let api = Arc::new(FakeApi::default());
        let controller = loaded_controller(api.clone()).await;

        controller.toggle_favorite("3").await.expect("known").await.expect("mirror");
        assert!(controller.model.lock().await.is_favorite("3").await);
        controller.toggle_favorite("3").await.expect("known").await.expect("mirror");
        assert!(!controller.model.lock().await.is_favorite("3").await);

        assert_eq!(api.calls(), ["check_favorite 3 guest", "add_favorite 3 guest", "remove_favorite 3 guest"]);
    }

    #[tokio::test]
    async fn quick_on_off_reaches_the_server_in_order() {
        let api = Arc::new(FakeApi::slow(50));
        let controller = loaded_controller(api.clone()).await;

        controller.toggle_favorite("3").await.expect("known");
        let last = controller.toggle_favorite("3").await.expect("known");
        last.await.expect("mirror");

        assert!(!controller.model.lock().await.is_favorite("3").await);
        assert_eq!(api.calls(), ["check_favorite 3 guest", "add_favorite 3 guest", "remove_favorite 3 guest"]);
    }

    #[tokio::test]
    async fn unknown_favorite_is_rejected_without_network() {
        let api = Arc::new(FakeApi::default());
        let controller = loaded_controller(api.clone()).await;
        assert!(controller.toggle_favorite("404").await.is_none());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn leaving_artist_detail_discards_refresh() {
        let api = Arc::new(FakeApi::with_catalog());
        let controller = loaded_controller(api).await;
        let artist = crate::model::sample_artists().remove(0);

        let token = {
            let model = controller.model.lock().await;
            model.show_artist_detail(artist.clone(), true).await;
            model.begin_request(RequestKind::ArtistDetail).await
        };
        controller.go_back().await;
        assert!(
            !controller
                .model
                .lock()
                .await
                .is_current_request(RequestKind::ArtistDetail, token)
                .await
        );

        controller.refresh_artist(artist.id, token).await;
        assert!(controller.model.lock().await.get_detail().await.is_none());
    }

    #[tokio::test]
    async fn picker_adds_whole_album() {
        let api = Arc::new(FakeApi::default());
        let controller = loaded_controller(api).await;
        controller.create_playlist("mix").await.expect("accepted").await.expect("mirror");

        controller.switch_view(View::Albums).await;
        controller.activate_selected().await;
        controller.pick_playlist_for_selection(true).await;
        controller.confirm_playlist_picker().await;

        let playlist = controller.model.lock().await.get_catalog().await.playlists[0].clone();
        assert_eq!(playlist.total_tracks(), 1);
        assert_eq!(playlist.entries[0].track.album, "ART ANGELS");
    }
}
