//! Pure derivations of what a view displays: filtered, searched and paginated
//! slices of the store's collections, plus pager labels.

use std::collections::HashSet;

use super::content::{Artist, Playlist, Track};
use super::types::{Catalog, View, ViewFilter, ViewParams};

/// How many tracks the "recently played" preset shows
pub const RECENTLY_PLAYED_LIMIT: usize = 3;

/// Pagers with up to this many pages list every page
const MAX_UNCOLLAPSED_PAGES: usize = 7;

/// One page of a projected collection
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the filtered collection
    pub total: usize,
    pub total_pages: usize,
}

/// An entry in the pager control
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageLabel {
    Number(usize),
    Ellipsis,
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Slices `[(page-1)*size, page*size)`; pages outside the range are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let total = items.len();
    let total_pages = total_pages(total, page_size);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    let page_items = if page == 0 || start >= total {
        Vec::new()
    } else {
        let end = (start + page_size).min(total);
        items[start..end].to_vec()
    };

    Page {
        items: page_items,
        total,
        total_pages,
    }
}

/// A page in `1..=total_pages`, or 1 when the collection is empty
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Case-insensitive substring match on title, artist or album
pub fn track_matches(track: &Track, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    q.is_empty()
        || contains_ci(&track.title, &q)
        || contains_ci(&track.artist, &q)
        || contains_ci(&track.album, &q)
}

pub fn filter_tracks(tracks: &[Track], filter: &ViewFilter) -> Vec<Track> {
    match filter {
        ViewFilter::All => tracks.to_vec(),
        ViewFilter::Genre(genre) => tracks.iter().filter(|t| &t.genre == genre).cloned().collect(),
        ViewFilter::RecentlyAdded => tracks.iter().rev().cloned().collect(),
        ViewFilter::RecentlyPlayed => tracks.iter().take(RECENTLY_PLAYED_LIMIT).cloned().collect(),
    }
}

/// Filter then search, without pagination. This is also the play queue for the view.
pub fn filtered_tracks(tracks: &[Track], params: &ViewParams) -> Vec<Track> {
    filter_tracks(tracks, &params.filter)
        .into_iter()
        .filter(|t| track_matches(t, &params.search))
        .collect()
}

pub fn project_tracks(tracks: &[Track], params: &ViewParams, page_size: usize) -> Page<Track> {
    paginate(&filtered_tracks(tracks, params), params.page, page_size)
}

pub fn filtered_artists(artists: &[Artist], params: &ViewParams) -> Vec<Artist> {
    let q = params.search.trim().to_lowercase();
    artists
        .iter()
        .filter(|a| q.is_empty() || contains_ci(&a.name, &q))
        .cloned()
        .collect()
}

pub fn project_artists(artists: &[Artist], params: &ViewParams, page_size: usize) -> Page<Artist> {
    paginate(&filtered_artists(artists, params), params.page, page_size)
}

pub fn project_playlists(
    playlists: &[Playlist],
    params: &ViewParams,
    page_size: usize,
) -> Page<Playlist> {
    let q = params.search.trim().to_lowercase();
    let filtered: Vec<Playlist> = playlists
        .iter()
        .filter(|p| q.is_empty() || contains_ci(&p.name, &q))
        .cloned()
        .collect();
    paginate(&filtered, params.page, page_size)
}

/// Tracks of `songs` whose id is in `favorites`, in catalog order
pub fn favorite_tracks(songs: &[Track], is_favorite: impl Fn(&str) -> bool) -> Vec<Track> {
    songs.iter().filter(|t| is_favorite(&t.id)).cloned().collect()
}

/// Tracks whose license asks for credit, in catalog order
pub fn attributed_tracks(songs: &[Track]) -> Vec<Track> {
    songs.iter().filter(|t| t.license.requires_attribution).cloned().collect()
}

/// Tracks by `artist`: its embedded top tracks, else matching songs from the catalog
pub fn artist_tracks(songs: &[Track], artist: &Artist) -> Vec<Track> {
    if !artist.top_tracks.is_empty() {
        return artist.top_tracks.clone();
    }
    let name = artist.name.to_uppercase();
    songs.iter().filter(|t| t.artist == name).cloned().collect()
}

/// The unfiltered track collection behind a track-listing view
pub fn source_tracks(
    catalog: &Catalog,
    favorites: &HashSet<String>,
    view: View,
    open_playlist: Option<&Playlist>,
) -> Vec<Track> {
    match view {
        View::Songs | View::Albums => catalog.songs.clone(),
        View::Favorites => favorite_tracks(&catalog.songs, |id| favorites.contains(id)),
        View::PlaylistDetail => open_playlist.map(Playlist::tracks).unwrap_or_default(),
        View::Artists | View::Playlists => Vec::new(),
    }
}

/// Projected rows of one view
#[derive(Clone, Debug, PartialEq)]
pub enum ScreenContent {
    Tracks(Page<Track>),
    Artists(Page<Artist>),
    Playlists(Page<Playlist>),
}

impl ScreenContent {
    pub fn row_count(&self) -> usize {
        match self {
            ScreenContent::Tracks(page) => page.items.len(),
            ScreenContent::Artists(page) => page.items.len(),
            ScreenContent::Playlists(page) => page.items.len(),
        }
    }

    pub fn total_pages(&self) -> usize {
        match self {
            ScreenContent::Tracks(page) => page.total_pages,
            ScreenContent::Artists(page) => page.total_pages,
            ScreenContent::Playlists(page) => page.total_pages,
        }
    }

    /// The pager hides itself for a single page
    pub fn shows_pager(&self) -> bool {
        self.total_pages() > 1
    }
}

pub fn project_view(
    catalog: &Catalog,
    favorites: &HashSet<String>,
    view: View,
    params: &ViewParams,
    open_playlist: Option<&Playlist>,
) -> ScreenContent {
    let size = view.page_size();
    match view {
        View::Artists => ScreenContent::Artists(project_artists(&catalog.artists, params, size)),
        View::Playlists => {
            ScreenContent::Playlists(project_playlists(&catalog.playlists, params, size))
        }
        _ => {
            let source = source_tracks(catalog, favorites, view, open_playlist);
            ScreenContent::Tracks(project_tracks(&source, params, size))
        }
    }
}

/// Page numbers for a pager, collapsing long ranges around the current page.
pub fn page_labels(current: usize, total: usize) -> Vec<PageLabel> {
    use PageLabel::{Ellipsis, Number};

    if total <= MAX_UNCOLLAPSED_PAGES {
        return (1..=total).map(Number).collect();
    }
    if current <= 3 {
        vec![Number(1), Number(2), Number(3), Number(4), Ellipsis, Number(total)]
    } else if current >= total - 2 {
        vec![
            Number(1),
            Ellipsis,
            Number(total - 3),
            Number(total - 2),
            Number(total - 1),
            Number(total),
        ]
    } else {
        vec![
            Number(1),
            Ellipsis,
            Number(current - 1),
            Number(current),
            Number(current + 1),
            Ellipsis,
            Number(total),
        ]
    }
}
