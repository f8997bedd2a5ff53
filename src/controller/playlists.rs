//! Playlist mutations. Local state changes immediately and stays authoritative;
//! the backend is mirrored in order in the background and never blocks or
//! reverts anything.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::model::{NewPlaylist, Playlist, Track};

use super::AppController;
use super::mirror::MirrorHandle;

const NEW_PLAYLIST_DESCRIPTION: &str = "User created playlist";
const NEW_PLAYLIST_COVER: &str =
    "https://images.unsplash.com/photo-1507838153414-b4b713384a76?w=500";

/// Display form of a playlist name, matching how server playlists are shown
fn display_name(name: &str) -> String {
    name.to_uppercase().replace(' ', "_")
}

/// Server id of a playlist at the moment its queued mirror runs. Playlists
/// created in this session learn theirs only once the create has gone through.
async fn server_id(
    adopted: &Mutex<HashMap<String, String>>,
    playlist_id: &str,
    known: Option<String>,
) -> Option<String> {
    match known {
        Some(remote_id) => Some(remote_id),
        None => adopted.lock().await.get(playlist_id).cloned(),
    }
}

impl AppController {
    /// Creates a playlist locally and mirrors it. Blank names are a no-op with
    /// no network call; `None` is returned for them.
    pub async fn create_playlist(&self, name: &str) -> Option<MirrorHandle> {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("Ignoring playlist with empty name");
            self.model.lock().await.set_error("Playlist name cannot be empty".to_string()).await;
            return None;
        }

        let local_id = {
            let model = self.model.lock().await;
            let local_id = model.next_local_playlist_id().await;
            model.add_playlist(Playlist::local(local_id.clone(), display_name(name))).await;
            local_id
        };
        tracing::info!(playlist_id = %local_id, name, "Created playlist locally");

        let body = NewPlaylist {
            name: name.to_string(),
            description: NEW_PLAYLIST_DESCRIPTION.to_string(),
            cover_url: NEW_PLAYLIST_COVER.to_string(),
            is_public: true,
        };
        let api = self.api.clone();
        let model = self.model.clone();
        let adopted = self.adopted_ids.clone();
        Some(self.mirror("create_playlist", async move {
            let created = api.create_playlist(&body).await?;
            if let Some(remote_id) = created.remote_id {
                adopted.lock().await.insert(local_id.clone(), remote_id.clone());
                model.lock().await.set_playlist_remote_id(&local_id, remote_id).await;
            }
            Ok(())
        }))
    }

    /// Removes a playlist locally (leaving its detail view if open) and mirrors the delete.
    pub async fn delete_playlist(&self, playlist_id: &str) -> Option<MirrorHandle> {
        let removed = self.model.lock().await.remove_playlist(playlist_id).await?;
        tracing::info!(playlist_id, name = %removed.name, "Deleted playlist locally");

        let api = self.api.clone();
        let adopted = self.adopted_ids.clone();
        let playlist_id = playlist_id.to_string();
        Some(self.mirror("delete_playlist", async move {
            let Some(remote_id) = server_id(&adopted, &playlist_id, removed.remote_id).await else {
                tracing::debug!(playlist_id = %playlist_id, "Deleted playlist never reached the server");
                return Ok(());
            };
            adopted.lock().await.remove(&playlist_id);
            api.delete_playlist(&remote_id).await
        }))
    }

    /// Appends a track to a playlist and mirrors it. Unknown tracks are rejected
    /// before any network call.
    pub async fn add_track_to_playlist(
        &self,
        playlist_id: &str,
        track_id: &str,
    ) -> Option<MirrorHandle> {
        let model = self.model.lock().await;
        let Some(track) = model.find_track(track_id).await else {
            model.set_error("Track is no longer in the catalog".to_string()).await;
            return None;
        };
        let Some((known, position)) = model.add_track_to_playlist(playlist_id, track).await else {
            tracing::debug!(playlist_id, track_id, "Track already in playlist");
            return None;
        };
        drop(model);
        tracing::info!(playlist_id, track_id, position, "Added track to playlist");

        let api = self.api.clone();
        let adopted = self.adopted_ids.clone();
        let playlist_id = playlist_id.to_string();
        let song_id = track_id.to_string();
        Some(self.mirror("add_track_to_playlist", async move {
            let Some(remote_id) = server_id(&adopted, &playlist_id, known).await else {
                tracing::debug!(playlist_id = %playlist_id, "Playlist has no server copy, add stays local");
                return Ok(());
            };
            api.add_track_to_playlist(&remote_id, &song_id, position).await
        }))
    }

    /// Adds several tracks in order, such as a whole album
    pub async fn add_tracks_to_playlist(&self, playlist_id: &str, tracks: &[Track]) -> usize {
        let mut added = 0;
        for track in tracks {
            let before = self.playlist_len(playlist_id).await;
            self.add_track_to_playlist(playlist_id, &track.id).await;
            if self.playlist_len(playlist_id).await > before {
                added += 1;
            }
        }
        added
    }

    async fn playlist_len(&self, playlist_id: &str) -> usize {
        self.model
            .lock()
            .await
            .find_playlist(playlist_id)
            .await
            .map(|p| p.total_tracks())
            .unwrap_or(0)
    }

    pub async fn remove_track_from_playlist(
        &self,
        playlist_id: &str,
        track_id: &str,
    ) -> Option<MirrorHandle> {
        let known = self
            .model
            .lock()
            .await
            .remove_track_from_playlist(playlist_id, track_id)
            .await?;
        tracing::info!(playlist_id, track_id, "Removed track from playlist");

        let api = self.api.clone();
        let adopted = self.adopted_ids.clone();
        let playlist_id = playlist_id.to_string();
        let song_id = track_id.to_string();
        Some(self.mirror("remove_track_from_playlist", async move {
            let Some(remote_id) = server_id(&adopted, &playlist_id, known).await else {
                tracing::debug!(playlist_id = %playlist_id, "Playlist has no server copy, removal stays local");
                return Ok(());
            };
            api.remove_track_from_playlist(&remote_id, &song_id).await
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::test_support::{FakeApi, loaded_controller};

    #[tokio::test]
    async fn blank_name_is_a_no_op_without_network() {
        let api = Arc::new(FakeApi::with_catalog());
        let controller = loaded_controller(api.clone()).await;

        assert!(controller.create_playlist("   ").await.is_none());
        assert_eq!(controller.model.lock().await.playlist_count().await, 0);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn created_playlist_adopts_server_id() {
        let api = Arc::new(FakeApi::with_catalog());
        let controller = loaded_controller(api.clone()).await;

        let mirror = controller.create_playlist(" night drive ").await.expect("accepted");
        mirror.await.expect("mirror task");

        let playlists = controller.model.lock().await.get_catalog().await.playlists;
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].name, "NIGHT_DRIVE");
        assert_eq!(playlists[0].remote_id.as_deref(), Some("srv-1"));
        assert_eq!(api.calls(), ["create_playlist night drive"]);
    }

    #[tokio::test]
    async fn remote_failure_keeps_local_playlist() {
        let api = Arc::new(FakeApi::failing());
        let controller = loaded_controller(api.clone()).await;

        let mirror = controller.create_playlist("offline").await.expect("accepted");
        mirror.await.expect("mirror task");

        let playlists = controller.model.lock().await.get_catalog().await.playlists;
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].remote_id, None);
        assert_eq!(api.calls_to("create_playlist"), 1);
    }

    #[tokio::test]
    async fn track_mutations_are_local_first_and_mirrored() {
        let api = Arc::new(FakeApi::with_catalog());
        let controller = loaded_controller(api.clone()).await;
        controller
            .create_playlist("mix")
            .await
            .expect("accepted")
            .await
            .expect("mirror task");
        let playlist_id = controller.model.lock().await.get_catalog().await.playlists[0].id.clone();

        controller
            .add_track_to_playlist(&playlist_id, "2")
            .await
            .expect("mirrored")
            .await
            .expect("mirror task");
        api.failing.store(true, std::sync::atomic::Ordering::SeqCst);
        controller
            .add_track_to_playlist(&playlist_id, "5")
            .await
            .expect("mirrored")
            .await
            .expect("mirror task");

        let playlist = controller
            .model
            .lock()
            .await
            .find_playlist(&playlist_id)
            .await
            .expect("still there");
        let ids: Vec<_> = playlist.entries.iter().map(|e| (e.track.id.as_str(), e.position)).collect();
        assert_eq!(ids, [("2", 0), ("5", 1)]);
        assert!(api.calls().contains(&"add_track_to_playlist srv-1 2 0".to_string()));

        controller
            .remove_track_from_playlist(&playlist_id, "2")
            .await
            .expect("mirrored")
            .await
            .expect("mirror task");
        let playlist = controller
            .model
            .lock()
            .await
            .find_playlist(&playlist_id)
            .await
            .expect("still there");
        assert_eq!(playlist.total_tracks(), 1);
    }

    #[tokio::test]
    async fn unknown_track_is_rejected_before_network() {
        let api = Arc::new(FakeApi::with_catalog());
        let controller = loaded_controller(api.clone()).await;
        controller
            .create_playlist("mix")
            .await
            .expect("accepted")
            .await
            .expect("mirror task");
        let playlist_id = controller.model.lock().await.get_catalog().await.playlists[0].id.clone();

        assert!(controller.add_track_to_playlist(&playlist_id, "missing").await.is_none());
        assert_eq!(api.calls_to("add_track_to_playlist"), 0);
    }

    #[tokio::test]
    async fn deleting_open_playlist_navigates_away_even_when_remote_fails() {
        let api = Arc::new(FakeApi::with_catalog());
        let controller = loaded_controller(api.clone()).await;
        controller
            .create_playlist("doomed")
            .await
            .expect("accepted")
            .await
            .expect("mirror task");
        let playlist = controller.model.lock().await.get_catalog().await.playlists[0].clone();
        controller.model.lock().await.open_playlist_view(playlist.id.clone()).await;

        api.failing.store(true, std::sync::atomic::Ordering::SeqCst);
        controller
            .delete_playlist(&playlist.id)
            .await
            .expect("mirrored")
            .await
            .expect("mirror task");

        let model = controller.model.lock().await;
        assert_eq!(model.playlist_count().await, 0);
        assert_eq!(model.active_view().await, crate::model::View::Playlists);
        assert_eq!(api.calls_to("delete_playlist"), 1);
    }

    #[tokio::test]
    async fn edits_made_before_the_create_lands_reach_the_server() {
        let api = Arc::new(FakeApi::slow(30));
        let controller = loaded_controller(api.clone()).await;
        controller.create_playlist("mix").await.expect("accepted");
        let playlist_id = controller.model.lock().await.get_catalog().await.playlists[0].id.clone();

        controller.add_track_to_playlist(&playlist_id, "2").await.expect("queued");
        controller
            .remove_track_from_playlist(&playlist_id, "2")
            .await
            .expect("queued")
            .await
            .expect("mirror task");

        assert_eq!(
            api.calls(),
            [
                "create_playlist mix",
                "add_track_to_playlist srv-1 2 0",
                "remove_track_from_playlist srv-1 2",
            ]
        );
    }

    #[tokio::test]
    async fn deleting_before_the_create_lands_removes_the_server_copy() {
        let api = Arc::new(FakeApi::slow(30));
        let controller = loaded_controller(api.clone()).await;
        controller.create_playlist("short lived").await.expect("accepted");
        let playlist_id = controller.model.lock().await.get_catalog().await.playlists[0].id.clone();

        controller
            .delete_playlist(&playlist_id)
            .await
            .expect("queued")
            .await
            .expect("mirror task");

        assert_eq!(controller.model.lock().await.playlist_count().await, 0);
        assert_eq!(api.calls(), ["create_playlist short lived", "delete_playlist srv-1"]);
    }

    #[tokio::test]
    async fn edits_on_a_playlist_the_server_never_got_stay_local() {
        let api = Arc::new(FakeApi::failing());
        let controller = loaded_controller(api.clone()).await;
        controller.create_playlist("offline").await.expect("accepted");
        let playlist_id = controller.model.lock().await.get_catalog().await.playlists[0].id.clone();

        controller
            .add_track_to_playlist(&playlist_id, "2")
            .await
            .expect("queued")
            .await
            .expect("mirror task");

        assert_eq!(api.calls(), ["create_playlist offline"]);
        let playlist = controller.model.lock().await.find_playlist(&playlist_id).await.expect("kept");
        assert_eq!(playlist.total_tracks(), 1);
    }
}
