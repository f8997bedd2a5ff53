//! In-memory gateway and controller fixtures for controller tests

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;

use crate::audio::ClockAudio;
use crate::config::AppConfig;
use crate::errors::GatewayError;
use crate::model::{
    Album, AppModel, Artist, CatalogApi, FavoriteAdded, FavoritesCache, GatewayResult,
    HealthStatus, ListQuery, NewPlaylist, Playlist, Track, sample_artists, sample_tracks,
};
use crate::session::SessionStore;

use super::AppController;

/// Records every call and fails them all while `failing` is set. Song
/// listings, creates and favorite checks wait `lag_ms` before answering.
#[derive(Default)]
pub struct FakeApi {
    pub calls: StdMutex<Vec<String>>,
    pub failing: AtomicBool,
    pub lag_ms: AtomicU64,
    pub songs: StdMutex<Vec<Track>>,
    pub artists: StdMutex<Vec<Artist>>,
    pub playlists: StdMutex<Vec<Playlist>>,
    pub albums: StdMutex<Vec<Album>>,
    pub favorites: StdMutex<Vec<String>>,
    created: AtomicUsize,
}

impl FakeApi {
    pub fn with_catalog() -> Self {
        let api = Self::default();
        *api.songs.lock().expect("songs lock") = sample_tracks();
        *api.artists.lock().expect("artists lock") = sample_artists();
        api
    }

    pub fn failing() -> Self {
        let api = Self::default();
        api.failing.store(true, Ordering::SeqCst);
        api
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn slow(lag_ms: u64) -> Self {
        let api = Self::with_catalog();
        api.lag_ms.store(lag_ms, Ordering::SeqCst);
        api
    }

    async fn lag(&self) {
        let lag_ms = self.lag_ms.load(Ordering::SeqCst);
        if lag_ms > 0 {
            tokio::time::sleep(Duration::from_millis(lag_ms)).await;
        }
    }

    fn record(&self, call: String) -> GatewayResult<()> {
        self.calls.lock().expect("calls lock").push(call);
        if self.failing.load(Ordering::SeqCst) {
            Err(GatewayError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogApi for FakeApi {
    async fn list_songs(&self, _query: &ListQuery) -> GatewayResult<Vec<Track>> {
        self.record("list_songs".into())?;
        let songs = self.songs.lock().expect("songs lock").clone();
        self.lag().await;
        Ok(songs)
    }

    async fn get_song(&self, id: &str) -> GatewayResult<Track> {
        self.record(format!("get_song {id}"))?;
        self.songs
            .lock()
            .expect("songs lock")
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(GatewayError::Status { status: 404, message: "Song not found".into() })
    }

    async fn list_artists(&self, _query: &ListQuery) -> GatewayResult<Vec<Artist>> {
        self.record("list_artists".into())?;
        Ok(self.artists.lock().expect("artists lock").clone())
    }

    async fn get_artist(&self, id: &str) -> GatewayResult<Artist> {
        self.record(format!("get_artist {id}"))?;
        self.artists
            .lock()
            .expect("artists lock")
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(GatewayError::Status { status: 404, message: "Artist not found".into() })
    }

    async fn artist_albums(&self, id: &str) -> GatewayResult<Vec<Album>> {
        self.record(format!("artist_albums {id}"))?;
        Ok(self.albums.lock().expect("albums lock").clone())
    }

    async fn artist_songs(&self, id: &str) -> GatewayResult<Vec<Track>> {
        self.record(format!("artist_songs {id}"))?;
        let songs = self.songs.lock().expect("songs lock");
        Ok(songs.iter().filter(|t| t.artist_id.as_deref() == Some(id)).cloned().collect())
    }

    async fn get_album(&self, id: &str) -> GatewayResult<Album> {
        self.record(format!("get_album {id}"))?;
        self.albums
            .lock()
            .expect("albums lock")
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(GatewayError::Status { status: 404, message: "Album not found".into() })
    }

    async fn album_tracks(&self, id: &str) -> GatewayResult<Vec<Track>> {
        self.record(format!("album_tracks {id}"))?;
        let songs = self.songs.lock().expect("songs lock");
        Ok(songs.iter().filter(|t| t.album_id.as_deref() == Some(id)).cloned().collect())
    }

    async fn list_playlists(&self) -> GatewayResult<Vec<Playlist>> {
        self.record("list_playlists".into())?;
        Ok(self.playlists.lock().expect("playlists lock").clone())
    }

    async fn get_playlist(&self, id: &str) -> GatewayResult<Playlist> {
        self.record(format!("get_playlist {id}"))?;
        self.playlists
            .lock()
            .expect("playlists lock")
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(GatewayError::Status { status: 404, message: "Playlist not found".into() })
    }

    async fn create_playlist(&self, playlist: &NewPlaylist) -> GatewayResult<Playlist> {
        self.lag().await;
        self.record(format!("create_playlist {}", playlist.name))?;
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        let mut created = Playlist::local(format!("srv-{n}"), playlist.name.clone());
        created.remote_id = Some(created.id.clone());
        Ok(created)
    }

    async fn delete_playlist(&self, id: &str) -> GatewayResult<()> {
        self.record(format!("delete_playlist {id}"))
    }

    async fn add_track_to_playlist(&self, id: &str, song_id: &str, position: i64) -> GatewayResult<()> {
        self.record(format!("add_track_to_playlist {id} {song_id} {position}"))
    }

    async fn remove_track_from_playlist(&self, id: &str, song_id: &str) -> GatewayResult<()> {
        self.record(format!("remove_track_from_playlist {id} {song_id}"))
    }

    async fn list_favorites(&self, user_id: &str) -> GatewayResult<Vec<String>> {
        self.record(format!("list_favorites {user_id}"))?;
        Ok(self.favorites.lock().expect("favorites lock").clone())
    }

    async fn add_favorite(&self, song_id: &str, user_id: &str) -> GatewayResult<FavoriteAdded> {
        self.record(format!("add_favorite {song_id} {user_id}"))?;
        Ok(FavoriteAdded::Created)
    }

    async fn remove_favorite(&self, song_id: &str, user_id: &str) -> GatewayResult<()> {
        self.record(format!("remove_favorite {song_id} {user_id}"))
    }

    async fn check_favorite(&self, song_id: &str, user_id: &str) -> GatewayResult<bool> {
        self.lag().await;
        self.record(format!("check_favorite {song_id} {user_id}"))?;
        Ok(self.favorites.lock().expect("favorites lock").iter().any(|id| id == song_id))
    }

    async fn health(&self) -> GatewayResult<HealthStatus> {
        self.record("health".into())?;
        Ok(HealthStatus {
            status: "OK".into(),
            ..HealthStatus::default()
        })
    }
}

fn scratch_dir(name: &str) -> std::path::PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("acidwave-ctl-{}-{}-{}", std::process::id(), name, n))
}

/// Controller over `api` with scratch paths for every persisted file
pub fn controller_with(api: Arc<FakeApi>) -> AppController {
    let dir = scratch_dir("fixture");
    let model = AppModel::new(FavoritesCache::in_dir(&dir), 0.5);
    AppController::new(
        Arc::new(tokio::sync::Mutex::new(model)),
        api,
        Box::new(ClockAudio::new()),
        AppConfig::default(),
        SessionStore::with_path(dir.join("current_user.json")),
    )
}

/// Controller with the sample catalog already loaded into the store
pub async fn loaded_controller(api: Arc<FakeApi>) -> AppController {
    let controller = controller_with(api);
    {
        let model = controller.model.lock().await;
        model.load_songs(sample_tracks(), false).await;
        model.load_artists(sample_artists()).await;
    }
    controller
}
