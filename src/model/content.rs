//! Catalog entities (tracks, artists, albums, playlists) and their
//! normalization from backend rows.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_COVER_URL: &str =
    "https://images.unsplash.com/photo-1614613535308-eb5fbd3d2c17?w=300&h=300&fit=crop";
pub const DEFAULT_ARTIST_IMAGE: &str =
    "https://images.unsplash.com/photo-1493225457124-a3eb161ffa5f?w=300&h=300&fit=crop";

const UNKNOWN_ARTIST: &str = "UNKNOWN";
const UNKNOWN_GENRE: &str = "UNKNOWN";
const SINGLE_ALBUM: &str = "SINGLE";

// ============================================================================
// Identifier helpers
// ============================================================================

/// Backend ids are integers for seeded rows and UUID strings for imported ones.
fn id_from_value<E: de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(E::custom(format!("expected string or number id, got {other}"))),
    }
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    id_from_value(Value::deserialize(deserializer)?)
}

pub(crate) fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => id_from_value(value).map(Some),
    }
}

// ============================================================================
// Wire rows
// ============================================================================

/// Artist reference embedded in a song or album row
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ArtistRef {
    Object {
        #[serde(default, deserialize_with = "deserialize_opt_id")]
        id: Option<String>,
        name: String,
        #[serde(default)]
        avatar_url: Option<String>,
    },
    Name(String),
}

impl ArtistRef {
    pub fn name(&self) -> &str {
        match self {
            ArtistRef::Object { name, .. } => name,
            ArtistRef::Name(name) => name,
        }
    }

    fn id(&self) -> Option<String> {
        match self {
            ArtistRef::Object { id, .. } => id.clone(),
            ArtistRef::Name(_) => None,
        }
    }

    fn avatar_url(&self) -> Option<&str> {
        match self {
            ArtistRef::Object { avatar_url, .. } => avatar_url.as_deref(),
            ArtistRef::Name(_) => None,
        }
    }
}

/// Album reference embedded in a song row
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum AlbumRef {
    Object {
        #[serde(default, deserialize_with = "deserialize_opt_id")]
        id: Option<String>,
        title: String,
        #[serde(default)]
        cover_url: Option<String>,
    },
    Title(String),
}

impl AlbumRef {
    pub fn title(&self) -> &str {
        match self {
            AlbumRef::Object { title, .. } => title,
            AlbumRef::Title(title) => title,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SongRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: Option<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub plays: Option<u64>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub requires_attribution: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ArtistRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub social_links: Option<BTreeMap<String, String>>,
    /// Either a list of album objects or a `[{count}]` aggregate
    #[serde(default)]
    pub albums: Option<Value>,
    /// `[{count}]` aggregate
    #[serde(default)]
    pub songs: Option<Value>,
    #[serde(default)]
    pub top_songs: Option<Vec<SongRow>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct AlbumRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: Option<ArtistRef>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub tracks: Option<Vec<SongRow>>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub requires_attribution: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PlaylistSongRow {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub song_id: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub songs: Option<SongRow>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PlaylistRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub playlist_songs: Option<Vec<PlaylistSongRow>>,
}

/// Body for `POST /playlists`
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
    pub cover_url: String,
    pub is_public: bool,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DatabaseHealth {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub tables_exist: bool,
    #[serde(default)]
    pub songs_count: u64,
}

/// Response of `GET /health` (not wrapped in the data envelope)
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub uptime: f64,
    #[serde(default)]
    pub database: DatabaseHealth,
}

// ============================================================================
// Domain entities
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct License {
    pub name: Option<String>,
    pub attribution: Option<String>,
    pub source_url: Option<String>,
    pub requires_attribution: bool,
}

impl License {
    /// `<license> · <attribution>`, or whichever of the two is set
    pub fn credit_line(&self) -> Option<String> {
        let name = self.name.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let attribution = self.attribution.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match (name, attribution) {
            (Some(name), Some(attribution)) => Some(format!("{name} · {attribution}")),
            (Some(text), None) | (None, Some(text)) => Some(text.to_string()),
            (None, None) => None,
        }
    }
}

/// A playable track, normalized for display
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub artist_id: Option<String>,
    pub album: String,
    pub album_id: Option<String>,
    pub cover_url: String,
    pub duration_secs: u32,
    pub url: String,
    pub genre: String,
    pub year: i32,
    pub plays: u64,
    pub likes: u64,
    pub rating: u8,
    pub track_number: Option<u32>,
    pub lyrics: Option<String>,
    pub license: License,
}

fn year_from_release_date(date: &str) -> Option<i32> {
    let day = date.get(..10).unwrap_or(date);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

fn rating_from(rating: Option<f64>, plays: u64) -> u8 {
    match rating {
        Some(r) if (1.0..=5.0).contains(&r) => r.round() as u8,
        _ => (plays / 5000 + 3).min(5) as u8,
    }
}

impl Track {
    pub fn from_row(row: SongRow) -> Self {
        let artist = row
            .artist
            .as_ref()
            .map(|a| a.name().to_uppercase())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let album = row
            .album
            .as_ref()
            .map(|a| a.title().to_uppercase())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| SINGLE_ALBUM.to_string());

        let album_cover = match &row.album {
            Some(AlbumRef::Object { cover_url, .. }) => cover_url.clone(),
            _ => None,
        };
        let cover_url = row
            .cover_url
            .clone()
            .or(album_cover)
            .or_else(|| row.artist.as_ref().and_then(|a| a.avatar_url().map(str::to_string)))
            .unwrap_or_else(|| DEFAULT_COVER_URL.to_string());

        let year = row
            .release_date
            .as_deref()
            .and_then(year_from_release_date)
            .or(row.year)
            .unwrap_or_else(|| chrono::Local::now().year());

        let plays = row.plays.unwrap_or(0);
        let album_id = match &row.album {
            Some(AlbumRef::Object { id, .. }) => id.clone(),
            _ => None,
        };

        Self {
            id: row.id,
            title: row.title.to_uppercase(),
            artist_id: row.artist.as_ref().and_then(ArtistRef::id),
            artist,
            album_id,
            album,
            cover_url,
            duration_secs: row.duration.map(|d| d.max(0.0).round() as u32).unwrap_or(0),
            url: row.url.unwrap_or_default(),
            genre: row
                .genre
                .map(|g| g.to_uppercase())
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| UNKNOWN_GENRE.to_string()),
            year,
            plays,
            likes: row.likes.unwrap_or(0),
            rating: rating_from(row.rating, plays),
            track_number: row.track_number,
            lyrics: row.lyrics,
            license: License {
                name: row.license,
                attribution: row.attribution,
                source_url: row.source_url,
                requires_attribution: row.requires_attribution.unwrap_or(false),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlbumSummary {
    pub id: String,
    pub title: String,
    pub cover_url: Option<String>,
    pub release_date: Option<String>,
}

impl From<&Album> for AlbumSummary {
    fn from(album: &Album) -> Self {
        Self {
            id: album.id.clone(),
            title: album.title.clone(),
            cover_url: Some(album.cover_url.clone()),
            release_date: album.release_date.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
    pub genres: Vec<String>,
    pub country: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub social_links: BTreeMap<String, String>,
    pub albums: Vec<AlbumSummary>,
    pub album_count: usize,
    pub song_count: usize,
    pub top_tracks: Vec<Track>,
}

/// Reads `[{"count": n}]` or `{"count": n}` aggregates.
fn aggregate_count(value: &Value) -> Option<usize> {
    let count = match value {
        Value::Array(items) => items.first()?.get("count")?,
        Value::Object(_) => value.get("count")?,
        _ => return None,
    };
    count.as_u64().map(|c| c as usize)
}

fn album_summaries(value: &Value) -> Vec<AlbumSummary> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let title = item.get("title")?.as_str()?.to_string();
            let id = id_from_value::<serde_json::Error>(item.get("id")?.clone()).ok()?;
            Some(AlbumSummary {
                id,
                title,
                cover_url: item.get("cover_url").and_then(Value::as_str).map(str::to_string),
                release_date: item
                    .get("release_date")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}

impl Artist {
    pub fn from_row(row: ArtistRow) -> Self {
        let albums = row.albums.as_ref().map(album_summaries).unwrap_or_default();
        let album_count = if albums.is_empty() {
            row.albums.as_ref().and_then(aggregate_count).unwrap_or(0)
        } else {
            albums.len()
        };
        let top_tracks: Vec<Track> = row
            .top_songs
            .unwrap_or_default()
            .into_iter()
            .map(Track::from_row)
            .collect();
        let song_count = row
            .songs
            .as_ref()
            .and_then(aggregate_count)
            .unwrap_or(top_tracks.len());

        Self {
            id: row.id,
            name: row.name,
            avatar_url: row
                .avatar_url
                .or(row.image)
                .unwrap_or_else(|| DEFAULT_ARTIST_IMAGE.to_string()),
            genres: row.genres.unwrap_or_default(),
            country: row.country,
            bio: row.bio,
            website: row.website_url.or(row.website),
            social_links: row.social_links.unwrap_or_default(),
            albums,
            album_count,
            song_count,
            top_tracks,
        }
    }

    /// Fields the list endpoint already provided survive a detail refresh that lacks them.
    pub fn merge_detail(&self, detail: Artist) -> Artist {
        Artist {
            album_count: if detail.albums.is_empty() { self.album_count } else { detail.albums.len() },
            albums: if detail.albums.is_empty() { self.albums.clone() } else { detail.albums },
            song_count: self.song_count.max(detail.song_count),
            ..detail
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlbumTrack {
    pub track_number: u32,
    pub track: Track,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub cover_url: String,
    pub release_date: Option<String>,
    pub genre: String,
    pub tracks: Vec<AlbumTrack>,
    pub license: License,
}

fn number_tracks(tracks: Vec<Track>) -> Vec<AlbumTrack> {
    tracks
        .into_iter()
        .enumerate()
        .map(|(i, track)| AlbumTrack {
            track_number: track.track_number.unwrap_or(i as u32 + 1),
            track,
        })
        .collect()
}

impl Album {
    pub fn duration_secs(&self) -> u32 {
        self.tracks.iter().map(|t| t.track.duration_secs).sum()
    }

    pub fn from_row(row: AlbumRow) -> Self {
        let artist = row
            .artist
            .as_ref()
            .map(|a| a.name().to_uppercase())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let tracks: Vec<Track> = row
            .tracks
            .unwrap_or_default()
            .into_iter()
            .map(Track::from_row)
            .collect();

        Self {
            id: row.id,
            title: row.title.to_uppercase(),
            artist,
            cover_url: row.cover_url.unwrap_or_else(|| DEFAULT_COVER_URL.to_string()),
            release_date: row.release_date,
            genre: row
                .genre
                .map(|g| g.to_uppercase())
                .unwrap_or_else(|| UNKNOWN_GENRE.to_string()),
            tracks: number_tracks(tracks),
            license: License {
                name: row.license,
                attribution: row.attribution,
                source_url: row.source_url,
                requires_attribution: row.requires_attribution.unwrap_or(false),
            },
        }
    }

    /// Replaces the track listing, renumbering tracks without a track number
    pub fn with_tracks(self, tracks: Vec<Track>) -> Self {
        Self {
            tracks: number_tracks(tracks),
            ..self
        }
    }

    /// Groups the loaded songs sharing `track`'s album and artist into an album.
    pub fn from_track(songs: &[Track], track: &Track) -> Self {
        let tracks: Vec<Track> = songs
            .iter()
            .filter(|s| s.album == track.album && s.artist == track.artist)
            .cloned()
            .collect();

        Self {
            id: track
                .album_id
                .clone()
                .unwrap_or_else(|| format!("album-{}", track.album)),
            title: track.album.clone(),
            artist: track.artist.clone(),
            cover_url: track.cover_url.clone(),
            release_date: Some(format!("{}-01-01", track.year)),
            genre: track.genre.clone(),
            tracks: number_tracks(tracks),
            license: track.license.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaylistEntry {
    pub position: i64,
    pub track: Track,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Playlist {
    /// Client-side key; equals `remote_id` for playlists loaded from the server
    pub id: String,
    pub remote_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub is_public: bool,
    pub entries: Vec<PlaylistEntry>,
    /// Whether `entries` reflects the server (or local edits) rather than an unfetched list
    pub entries_loaded: bool,
}

impl Playlist {
    pub fn local(id: String, name: String) -> Self {
        Self {
            id,
            remote_id: None,
            name,
            description: None,
            cover_url: None,
            is_public: true,
            entries: Vec::new(),
            entries_loaded: true,
        }
    }

    pub fn from_row(row: PlaylistRow) -> Self {
        let entries_loaded = row.playlist_songs.is_some();
        let mut entries: Vec<PlaylistEntry> = row
            .playlist_songs
            .unwrap_or_default()
            .into_iter()
            .filter_map(|ps| {
                let position = ps.position.unwrap_or(0);
                ps.songs.map(|song| PlaylistEntry {
                    position,
                    track: Track::from_row(song),
                })
            })
            .collect();
        // Stable sort keeps insertion order among equal positions
        entries.sort_by_key(|e| e.position);

        Self {
            id: row.id.clone(),
            remote_id: Some(row.id),
            name: row.name.to_uppercase().replace(' ', "_"),
            description: row.description,
            cover_url: row.cover_url,
            is_public: row.is_public.unwrap_or(true),
            entries,
            entries_loaded,
        }
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.entries.iter().map(|e| e.track.clone()).collect()
    }

    pub fn total_tracks(&self) -> usize {
        self.entries.len()
    }

    pub fn total_duration_secs(&self) -> u32 {
        self.entries.iter().map(|e| e.track.duration_secs).sum()
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.entries.iter().any(|e| e.track.id == track_id)
    }

    /// Appends after the current last position; returns the position used.
    pub fn push_track(&mut self, track: Track) -> i64 {
        let position = self.entries.last().map(|e| e.position + 1).unwrap_or(0);
        self.entries.push(PlaylistEntry { position, track });
        position
    }

    pub fn remove_track(&mut self, track_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.track.id != track_id);
        self.entries.len() != before
    }
}
