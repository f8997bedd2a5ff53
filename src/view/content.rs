//! Main content area rendering (collection tables, detail views, pager)

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Padding, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::model::{
    Album, Artist, DetailView, Page, Playlist, Screen, ScreenContent, Track, UiState, View,
    artist_tracks,
};
use super::utils::{
    ACCENT, ACID, border_style, calculate_num_width, format_duration, pager_line, rating_stars,
    selected_style, split_pager, truncate_string,
};

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    screen: &Screen,
    ui_state: &UiState,
    songs: &[Track],
    now_playing: Option<&str>,
) {
    match &ui_state.detail {
        Some(DetailView::Album { album, selected_index }) => {
            render_album_detail(frame, area, album, *selected_index, &screen.favorites, now_playing);
            return;
        }
        Some(DetailView::Artist { artist, selected_index, refreshing }) => {
            let tracks = artist_tracks(songs, artist);
            render_artist_detail(
                frame,
                area,
                artist,
                &tracks,
                *selected_index,
                *refreshing,
                &screen.favorites,
                now_playing,
            );
            return;
        }
        None => {}
    }

    let selected = ui_state.selected_in(screen.view);
    let title = content_title(screen);

    if ui_state.is_loading(screen.view) && screen.content.row_count() == 0 {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(loading, area);
        return;
    }

    if screen.content.row_count() == 0 {
        let empty = Paragraph::new(empty_message(screen))
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .padding(Padding::uniform(1)),
            );
        frame.render_widget(empty, area);
        return;
    }

    let (table_area, pager_area) = split_pager(area);
    match &screen.content {
        ScreenContent::Tracks(page) if screen.view == View::Albums => {
            render_album_cards(frame, table_area, title, page, selected);
        }
        ScreenContent::Tracks(page) => {
            let first = screen.params.page.saturating_sub(1) * screen.view.page_size();
            render_track_table(
                frame,
                table_area,
                title,
                page,
                first,
                selected,
                &screen.favorites,
                now_playing,
            );
        }
        ScreenContent::Artists(page) => render_artist_table(frame, table_area, title, page, selected),
        ScreenContent::Playlists(page) => {
            render_playlist_table(frame, table_area, title, page, selected)
        }
    }

    if screen.content.shows_pager() {
        let pager = pager_line(screen.params.page, screen.content.total_pages());
        frame.render_widget(Paragraph::new(pager), pager_area);
    }
}

fn content_title(screen: &Screen) -> String {
    match (&screen.view, &screen.open_playlist) {
        (View::PlaylistDetail, Some(playlist)) => format!(
            " {} · {} tracks · {} ",
            playlist.name,
            playlist.total_tracks(),
            format_duration(playlist.total_duration_secs())
        ),
        _ => format!(" {} ", screen.view.title()),
    }
}

fn empty_message(screen: &Screen) -> String {
    if !screen.params.search.is_empty() {
        return format!("No results for \"{}\"", screen.params.search);
    }
    match screen.view {
        View::Favorites => "No favorites yet. Press f on a track to add it.".to_string(),
        View::Playlists => "No playlists yet. Press c to create one.".to_string(),
        View::PlaylistDetail => "This playlist is empty. Press a on a track to add it.".to_string(),
        _ => "Nothing to show.".to_string(),
    }
}

fn header(cells: &[&'static str]) -> Row<'static> {
    Row::new(cells.iter().copied().map(Cell::from))
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD))
}

fn render_table(
    frame: &mut Frame,
    area: Rect,
    title: impl Into<Line<'static>>,
    header_row: Row<'static>,
    rows: Vec<Row<'static>>,
    widths: Vec<Constraint>,
    selected: usize,
) {
    let table = Table::new(rows, widths)
        .header(header_row)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style(true)),
        )
        .row_highlight_style(selected_style())
        .column_spacing(2);

    let mut state = TableState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn track_row(
    number: usize,
    num_width: usize,
    track: &Track,
    favorites: &HashSet<String>,
    now_playing: Option<&str>,
) -> Row<'static> {
    let playing = now_playing == Some(track.id.as_str());
    let marker = if playing {
        "▶".to_string()
    } else {
        format!("{number:>num_width$}")
    };
    let heart = if favorites.contains(&track.id) { "♥" } else { " " };
    let style = if playing {
        Style::default().fg(ACCENT)
    } else {
        Style::default()
    };

    Row::new(vec![
        Cell::from(marker),
        Cell::from(Span::styled(heart, Style::default().fg(ACID))),
        Cell::from(track.title.clone()),
        Cell::from(track.artist.clone()),
        Cell::from(track.album.clone()),
        Cell::from(track.genre.clone()),
        Cell::from(format_duration(track.duration_secs)),
    ])
    .style(style)
}

fn track_widths(num_width: usize) -> Vec<Constraint> {
    vec![
        Constraint::Length(num_width as u16),
        Constraint::Length(1),
        Constraint::Percentage(32),
        Constraint::Percentage(22),
        Constraint::Percentage(22),
        Constraint::Length(8),
        Constraint::Length(6),
    ]
}

#[allow(clippy::too_many_arguments)]
fn render_track_table(
    frame: &mut Frame,
    area: Rect,
    title: String,
    page: &Page<Track>,
    first: usize,
    selected: usize,
    favorites: &HashSet<String>,
    now_playing: Option<&str>,
) {
    let num_width = calculate_num_width(page.total);
    let rows = page
        .items
        .iter()
        .enumerate()
        .map(|(i, track)| track_row(first + i + 1, num_width, track, favorites, now_playing))
        .collect();

    render_table(
        frame,
        area,
        format!("{title}({}) ", page.total),
        header(&["#", "", "TITLE", "ARTIST", "ALBUM", "GENRE", "TIME"]),
        rows,
        track_widths(num_width),
        selected,
    );
}

fn render_album_cards(
    frame: &mut Frame,
    area: Rect,
    title: String,
    page: &Page<Track>,
    selected: usize,
) {
    let rows = page
        .items
        .iter()
        .map(|track| {
            Row::new(vec![
                Cell::from(track.album.clone()),
                Cell::from(track.artist.clone()),
                Cell::from(track.year.to_string()),
                Cell::from(track.genre.clone()),
                Cell::from(Span::styled(rating_stars(track.rating), Style::default().fg(ACID))),
            ])
        })
        .collect();

    render_table(
        frame,
        area,
        format!("{title}({}) ", page.total),
        header(&["ALBUM", "ARTIST", "YEAR", "GENRE", "RATING"]),
        rows,
        vec![
            Constraint::Percentage(35),
            Constraint::Percentage(30),
            Constraint::Length(4),
            Constraint::Length(8),
            Constraint::Length(5),
        ],
        selected,
    );
}

fn render_artist_table(
    frame: &mut Frame,
    area: Rect,
    title: String,
    page: &Page<Artist>,
    selected: usize,
) {
    let rows = page
        .items
        .iter()
        .map(|artist| {
            Row::new(vec![
                Cell::from(artist.name.clone()),
                Cell::from(artist.genres.join(", ")),
                Cell::from(artist.country.clone().unwrap_or_default()),
                Cell::from(artist.album_count.to_string()),
                Cell::from(artist.song_count.to_string()),
            ])
        })
        .collect();

    render_table(
        frame,
        area,
        format!("{title}({}) ", page.total),
        header(&["ARTIST", "GENRES", "COUNTRY", "ALBUMS", "SONGS"]),
        rows,
        vec![
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(6),
        ],
        selected,
    );
}

fn render_playlist_table(
    frame: &mut Frame,
    area: Rect,
    title: String,
    page: &Page<Playlist>,
    selected: usize,
) {
    let rows = page
        .items
        .iter()
        .map(|playlist| {
            let tracks = if playlist.entries_loaded {
                playlist.total_tracks().to_string()
            } else {
                "-".to_string()
            };
            let origin = if playlist.remote_id.is_some() { "" } else { "local" };
            Row::new(vec![
                Cell::from(playlist.name.clone()),
                Cell::from(playlist.description.clone().unwrap_or_default()),
                Cell::from(tracks),
                Cell::from(Span::styled(origin, Style::default().fg(Color::DarkGray))),
            ])
        })
        .collect();

    render_table(
        frame,
        area,
        format!("{title}({}) ", page.total),
        header(&["NAME", "DESCRIPTION", "TRACKS", ""]),
        rows,
        vec![
            Constraint::Percentage(35),
            Constraint::Percentage(45),
            Constraint::Length(6),
            Constraint::Length(5),
        ],
        selected,
    );
}

fn render_album_detail(
    frame: &mut Frame,
    area: Rect,
    album: &Album,
    selected: usize,
    favorites: &HashSet<String>,
    now_playing: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let mut info = vec![
        Line::from(Span::styled(
            album.title.clone(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "{} · {} · {} tracks · {}",
            album.artist,
            album.genre,
            album.tracks.len(),
            format_duration(album.duration_secs())
        )),
    ];
    if let Some(license) = &album.license.name {
        info.push(Line::from(Span::styled(
            format!("License: {license}"),
            Style::default().fg(Color::DarkGray),
        )));
    }
    let header_widget = Paragraph::new(info).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Album (Esc to close) ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(header_widget, chunks[0]);

    let num_width = calculate_num_width(album.tracks.len());
    let rows = album
        .tracks
        .iter()
        .map(|t| track_row(t.track_number as usize, num_width, &t.track, favorites, now_playing))
        .collect();
    render_table(
        frame,
        chunks[1],
        " Tracks ",
        header(&["#", "", "TITLE", "ARTIST", "ALBUM", "GENRE", "TIME"]),
        rows,
        track_widths(num_width),
        selected,
    );
}

#[allow(clippy::too_many_arguments)]
fn render_artist_detail(
    frame: &mut Frame,
    area: Rect,
    artist: &Artist,
    tracks: &[Track],
    selected: usize,
    refreshing: bool,
    favorites: &HashSet<String>,
    now_playing: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    let mut title_spans = vec![Span::styled(
        artist.name.clone(),
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    )];
    if refreshing {
        title_spans.push(Span::styled("  refreshing…", Style::default().fg(Color::Yellow)));
    }

    let mut meta = vec![format!("{} albums", artist.album_count), format!("{} songs", artist.song_count)];
    if let Some(country) = &artist.country {
        meta.push(country.clone());
    }
    if !artist.genres.is_empty() {
        meta.push(artist.genres.join(", "));
    }

    let mut info = vec![Line::from(title_spans), Line::from(meta.join(" · "))];
    if let Some(bio) = &artist.bio {
        info.push(Line::from(Span::styled(
            truncate_string(bio, area.width.saturating_sub(6) as usize * 2),
            Style::default().fg(Color::Gray),
        )));
    }
    if let Some(website) = &artist.website {
        info.push(Line::from(Span::styled(website.clone(), Style::default().fg(Color::Cyan))));
    }

    let header_widget = Paragraph::new(info)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Artist (Esc to close) ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(header_widget, chunks[0]);

    if tracks.is_empty() {
        let empty = Paragraph::new("No tracks by this artist in the catalog.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Top Tracks "));
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let num_width = calculate_num_width(tracks.len());
    let rows = tracks
        .iter()
        .enumerate()
        .map(|(i, track)| track_row(i + 1, num_width, track, favorites, now_playing))
        .collect();
    render_table(
        frame,
        chunks[1],
        " Top Tracks ",
        header(&["#", "", "TITLE", "ARTIST", "ALBUM", "GENRE", "TIME"]),
        rows,
        track_widths(num_width),
        selected,
    );
}
