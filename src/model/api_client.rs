//! REST client for the ACIDWAVE backend, with the `{success, data}` envelope unwrapped

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::GatewayError;
use crate::{log_api_request, log_api_result};
use super::content::{
    Album, AlbumRow, Artist, ArtistRow, HealthStatus, NewPlaylist, Playlist, PlaylistRow, SongRow,
    Track,
};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Query parameters accepted by the collection endpoints
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort: Option<String>,
    pub include_albums: bool,
}

impl ListQuery {
    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.clone()));
        }
        if let Some(genre) = self.genre.as_ref().filter(|g| !g.is_empty()) {
            pairs.push(("genre", genre.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        if self.include_albums {
            pairs.push(("include_albums", "true".to_string()));
        }
        pairs
    }
}

/// Response envelope shared by every route except `/health`
#[derive(Deserialize, Debug)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    is_favorited: Option<bool>,
}

#[derive(Serialize)]
struct PlaylistSongBody<'a> {
    song_id: &'a str,
    position: i64,
}

#[derive(Serialize)]
struct FavoriteBody<'a> {
    song_id: &'a str,
    user_id: &'a str,
}

#[derive(Deserialize, Debug)]
struct FavoriteRow {
    #[serde(deserialize_with = "super::content::deserialize_id")]
    song_id: String,
}

/// Outcome of adding a favorite; duplicates are not errors
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FavoriteAdded {
    Created,
    AlreadyFavorited,
}

/// Parses a response body, turning non-2xx statuses and `success: false` into errors.
fn unwrap_envelope(status: u16, body: &str) -> GatewayResult<Envelope> {
    let parsed: Result<Envelope, _> = serde_json::from_str(body);
    let ok_status = (200..300).contains(&status);

    match parsed {
        Ok(envelope) if ok_status && envelope.success != Some(false) => Ok(envelope),
        Ok(envelope) => Err(GatewayError::Status {
            status,
            message: envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| format!("HTTP error! status: {status}")),
        }),
        Err(_) if !ok_status => Err(GatewayError::Status {
            status,
            message: format!("HTTP error! status: {status}"),
        }),
        Err(e) => Err(GatewayError::Decode(e.to_string())),
    }
}

fn data_as<T: DeserializeOwned>(envelope: Envelope) -> GatewayResult<T> {
    let data = envelope
        .data
        .ok_or_else(|| GatewayError::Decode("response has no data".to_string()))?;
    Ok(serde_json::from_value(data)?)
}

/// Missing or null `data` on list routes means an empty list.
fn list_as<T: DeserializeOwned>(envelope: Envelope) -> GatewayResult<Vec<T>> {
    match envelope.data {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(data) => Ok(serde_json::from_value(data)?),
    }
}

/// Logical operations against the backend
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_songs(&self, query: &ListQuery) -> GatewayResult<Vec<Track>>;
    async fn get_song(&self, id: &str) -> GatewayResult<Track>;

    async fn list_artists(&self, query: &ListQuery) -> GatewayResult<Vec<Artist>>;
    async fn get_artist(&self, id: &str) -> GatewayResult<Artist>;
    async fn artist_albums(&self, id: &str) -> GatewayResult<Vec<Album>>;
    async fn artist_songs(&self, id: &str) -> GatewayResult<Vec<Track>>;

    async fn get_album(&self, id: &str) -> GatewayResult<Album>;
    async fn album_tracks(&self, id: &str) -> GatewayResult<Vec<Track>>;

    async fn list_playlists(&self) -> GatewayResult<Vec<Playlist>>;
    async fn get_playlist(&self, id: &str) -> GatewayResult<Playlist>;
    async fn create_playlist(&self, playlist: &NewPlaylist) -> GatewayResult<Playlist>;
    async fn delete_playlist(&self, id: &str) -> GatewayResult<()>;
    async fn add_track_to_playlist(&self, id: &str, song_id: &str, position: i64) -> GatewayResult<()>;
    async fn remove_track_from_playlist(&self, id: &str, song_id: &str) -> GatewayResult<()>;

    async fn list_favorites(&self, user_id: &str) -> GatewayResult<Vec<String>>;
    async fn add_favorite(&self, song_id: &str, user_id: &str) -> GatewayResult<FavoriteAdded>;
    async fn remove_favorite(&self, song_id: &str, user_id: &str) -> GatewayResult<()>;
    async fn check_favorite(&self, song_id: &str, user_id: &str) -> GatewayResult<bool>;

    async fn health(&self) -> GatewayResult<HealthStatus>;
}

/// HTTP implementation of [`CatalogApi`]
#[derive(Clone)]
pub struct AcidwaveClient {
    http: Client,
    base_url: String,
}

impl AcidwaveClient {
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("acidwave/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<Value>,
    ) -> GatewayResult<(StatusCode, String)> {
        let mut request = self.http.request(method, self.url(path)).query(query);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<Value>,
    ) -> GatewayResult<Envelope> {
        let (status, text) = self.send(method, path, query, body).await?;
        unwrap_envelope(status.as_u16(), &text)
    }

    async fn get(&self, path: &str, query: &[(&'static str, String)]) -> GatewayResult<Envelope> {
        self.call(Method::GET, path, query, None).await
    }
}

fn json_body<T: Serialize>(body: &T) -> GatewayResult<Option<Value>> {
    Ok(Some(serde_json::to_value(body)?))
}

#[async_trait]
impl CatalogApi for AcidwaveClient {
    async fn list_songs(&self, query: &ListQuery) -> GatewayResult<Vec<Track>> {
        log_api_request!("list_songs", limit = ?query.limit);
        let result = self.get("/songs", &query.to_pairs()).await.and_then(list_as::<SongRow>);
        log_api_result!("list_songs", result);
        Ok(result?.into_iter().map(Track::from_row).collect())
    }

    async fn get_song(&self, id: &str) -> GatewayResult<Track> {
        log_api_request!("get_song", song_id = id);
        let result = self.get(&format!("/songs/{id}"), &[]).await.and_then(data_as::<SongRow>);
        log_api_result!("get_song", result);
        Ok(Track::from_row(result?))
    }

    async fn list_artists(&self, query: &ListQuery) -> GatewayResult<Vec<Artist>> {
        log_api_request!("list_artists", limit = ?query.limit);
        let result = self.get("/artists", &query.to_pairs()).await.and_then(list_as::<ArtistRow>);
        log_api_result!("list_artists", result);
        Ok(result?.into_iter().map(Artist::from_row).collect())
    }

    async fn get_artist(&self, id: &str) -> GatewayResult<Artist> {
        log_api_request!("get_artist", artist_id = id);
        let result = self
            .get(&format!("/artists/{id}"), &[])
            .await
            .and_then(data_as::<ArtistRow>);
        log_api_result!("get_artist", result);
        Ok(Artist::from_row(result?))
    }

    async fn artist_albums(&self, id: &str) -> GatewayResult<Vec<Album>> {
        let rows: Vec<AlbumRow> = list_as(self.get(&format!("/artists/{id}/albums"), &[]).await?)?;
        Ok(rows.into_iter().map(Album::from_row).collect())
    }

    async fn artist_songs(&self, id: &str) -> GatewayResult<Vec<Track>> {
        let rows: Vec<SongRow> = list_as(self.get(&format!("/artists/{id}/songs"), &[]).await?)?;
        Ok(rows.into_iter().map(Track::from_row).collect())
    }

    async fn get_album(&self, id: &str) -> GatewayResult<Album> {
        log_api_request!("get_album", album_id = id);
        let result = self
            .get(&format!("/albums/{id}"), &[])
            .await
            .and_then(data_as::<AlbumRow>);
        log_api_result!("get_album", result);
        Ok(Album::from_row(result?))
    }

    async fn album_tracks(&self, id: &str) -> GatewayResult<Vec<Track>> {
        let rows: Vec<SongRow> = list_as(self.get(&format!("/albums/{id}/tracks"), &[]).await?)?;
        Ok(rows.into_iter().map(Track::from_row).collect())
    }

    async fn list_playlists(&self) -> GatewayResult<Vec<Playlist>> {
        log_api_request!("list_playlists");
        let result = self.get("/playlists", &[]).await.and_then(list_as::<PlaylistRow>);
        log_api_result!("list_playlists", result);
        Ok(result?.into_iter().map(Playlist::from_row).collect())
    }

    async fn get_playlist(&self, id: &str) -> GatewayResult<Playlist> {
        log_api_request!("get_playlist", playlist_id = id);
        let result = self
            .get(&format!("/playlists/{id}"), &[])
            .await
            .and_then(data_as::<PlaylistRow>);
        log_api_result!("get_playlist", result);
        Ok(Playlist::from_row(result?))
    }

    async fn create_playlist(&self, playlist: &NewPlaylist) -> GatewayResult<Playlist> {
        log_api_request!("create_playlist", name = %playlist.name);
        let result = self
            .call(Method::POST, "/playlists", &[], json_body(playlist)?)
            .await
            .and_then(data_as::<PlaylistRow>);
        log_api_result!("create_playlist", result);
        Ok(Playlist::from_row(result?))
    }

    async fn delete_playlist(&self, id: &str) -> GatewayResult<()> {
        log_api_request!("delete_playlist", playlist_id = id);
        let result = self.call(Method::DELETE, &format!("/playlists/{id}"), &[], None).await;
        log_api_result!("delete_playlist", result);
        result.map(|_| ())
    }

    async fn add_track_to_playlist(&self, id: &str, song_id: &str, position: i64) -> GatewayResult<()> {
        log_api_request!("add_track_to_playlist", playlist_id = id, song_id, position);
        let body = PlaylistSongBody { song_id, position };
        let result = self
            .call(Method::POST, &format!("/playlists/{id}/songs"), &[], json_body(&body)?)
            .await;
        log_api_result!("add_track_to_playlist", result);
        result.map(|_| ())
    }

    async fn remove_track_from_playlist(&self, id: &str, song_id: &str) -> GatewayResult<()> {
        log_api_request!("remove_track_from_playlist", playlist_id = id, song_id);
        let result = self
            .call(Method::DELETE, &format!("/playlists/{id}/songs/{song_id}"), &[], None)
            .await;
        log_api_result!("remove_track_from_playlist", result);
        result.map(|_| ())
    }

    async fn list_favorites(&self, user_id: &str) -> GatewayResult<Vec<String>> {
        let query = [("user_id", user_id.to_string())];
        let rows: Vec<FavoriteRow> = list_as(self.get("/favorites", &query).await?)?;
        Ok(rows.into_iter().map(|r| r.song_id).collect())
    }

    async fn add_favorite(&self, song_id: &str, user_id: &str) -> GatewayResult<FavoriteAdded> {
        log_api_request!("add_favorite", song_id, user_id);
        let body = FavoriteBody { song_id, user_id };
        let result = self.call(Method::POST, "/favorites", &[], json_body(&body)?).await;
        log_api_result!("add_favorite", result);
        // A duplicate insert answers 200 with null data instead of 201
        Ok(match result?.data {
            None | Some(Value::Null) => FavoriteAdded::AlreadyFavorited,
            Some(_) => FavoriteAdded::Created,
        })
    }

    async fn remove_favorite(&self, song_id: &str, user_id: &str) -> GatewayResult<()> {
        log_api_request!("remove_favorite", song_id, user_id);
        let query = [("user_id", user_id.to_string())];
        let result = self
            .call(Method::DELETE, &format!("/favorites/{song_id}"), &query, None)
            .await;
        log_api_result!("remove_favorite", result);
        result.map(|_| ())
    }

    async fn check_favorite(&self, song_id: &str, user_id: &str) -> GatewayResult<bool> {
        let body = FavoriteBody { song_id, user_id };
        let envelope = self.call(Method::POST, "/favorites/check", &[], json_body(&body)?).await?;
        Ok(envelope.is_favorited.unwrap_or(false))
    }

    async fn health(&self) -> GatewayResult<HealthStatus> {
        let (status, text) = self.send(Method::GET, "/health", &[], None).await?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: "Service unavailable".to_string(),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_data_is_unwrapped() {
        let envelope = unwrap_envelope(200, r#"{"success":true,"count":1,"data":[{"id":1,"title":"a"}]}"#)
            .expect("ok envelope");
        let rows: Vec<SongRow> = list_as(envelope).expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "1");
    }

    #[test]
    fn not_found_carries_status_and_message() {
        let err = unwrap_envelope(404, r#"{"success":false,"error":"Artist not found"}"#)
            .expect_err("404 is an error");
        assert!(matches!(err, GatewayError::Status { status: 404, .. }));
        assert!(err.to_string().contains("Artist not found"));
    }

    #[test]
    fn success_false_with_2xx_is_an_error() {
        let err = unwrap_envelope(200, r#"{"success":false,"error":"boom"}"#).expect_err("failure");
        assert!(matches!(err, GatewayError::Status { status: 200, .. }));
    }

    #[test]
    fn non_json_error_page_is_a_status_error() {
        let err = unwrap_envelope(502, "<html>Bad gateway</html>").expect_err("502");
        assert!(matches!(err, GatewayError::Status { status: 502, .. }));
    }

    #[test]
    fn non_json_success_is_a_decode_error() {
        let err = unwrap_envelope(200, "not json").expect_err("garbage");
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn missing_list_data_is_empty() {
        let envelope = unwrap_envelope(200, r#"{"success":true}"#).expect("ok");
        let rows: Vec<SongRow> = list_as(envelope).expect("empty");
        assert!(rows.is_empty());
    }

    #[test]
    fn missing_object_data_is_a_decode_error() {
        let envelope = unwrap_envelope(200, r#"{"success":true}"#).expect("ok");
        assert!(matches!(data_as::<SongRow>(envelope), Err(GatewayError::Decode(_))));
    }

    #[test]
    fn query_pairs_skip_empty_values() {
        let query = ListQuery {
            search: Some(String::new()),
            genre: Some("TECHNO".to_string()),
            limit: Some(200),
            include_albums: true,
            ..ListQuery::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("genre", "TECHNO".to_string()),
                ("limit", "200".to_string()),
                ("include_albums", "true".to_string()),
            ]
        );
    }

    #[test]
    fn favorites_rows_yield_song_ids() {
        let envelope = unwrap_envelope(
            200,
            r#"{"success":true,"data":[{"id":9,"song_id":4,"songs":null},{"id":10,"song_id":"x"}]}"#,
        )
        .expect("ok");
        let rows: Vec<FavoriteRow> = list_as(envelope).expect("rows");
        let ids: Vec<_> = rows.into_iter().map(|r| r.song_id).collect();
        assert_eq!(ids, ["4", "x"]);
    }
}
