//! Overlay rendering (error notification, playlist picker, licenses, text prompts, key hints)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
        Wrap,
    },
    Frame,
};

use crate::model::{Playlist, Track, UiState};
use super::utils::{ACCENT, ACID, centered_rect, selected_style};

/// Non-blocking banner pinned to the bottom of the content area
pub fn render_error_notification(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let Some(ref error_msg) = ui_state.error_message else {
        return;
    };

    let popup_width = 64.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize;
    let line_count = error_msg.chars().count().div_ceil(inner_width).max(1);
    let popup_height = u16::try_from(line_count)
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(area.height.saturating_sub(2));

    let popup_area = Rect {
        x: area.x + area.width.saturating_sub(popup_width) / 2,
        y: area.y + area.height.saturating_sub(popup_height + 1),
        width: popup_width,
        height: popup_height,
    };
    frame.render_widget(Clear, popup_area);

    let title = if ui_state.retry_available {
        " Error (r to retry) "
    } else {
        " Error "
    };
    let error_widget = Paragraph::new(error_msg.to_string())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(title)
                .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );
    frame.render_widget(error_widget, popup_area);
}

/// Widest entry plus the track count and borders, within 36..=60 columns
fn picker_width(playlists: &[Playlist]) -> u16 {
    let widest = playlists.iter().map(|p| p.name.chars().count() + 10).max().unwrap_or(30);
    u16::try_from(widest).unwrap_or(u16::MAX).saturating_add(6).clamp(36, 60)
}

fn picker_height(playlists: &[Playlist]) -> u16 {
    u16::try_from(playlists.len()).unwrap_or(u16::MAX).saturating_add(2).max(5)
}

pub fn render_playlist_picker(
    frame: &mut Frame,
    playlists: &[Playlist],
    pending: usize,
    selected: usize,
) {
    let popup_area = centered_rect(frame.area(), picker_width(playlists), picker_height(playlists));
    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = playlists
        .iter()
        .enumerate()
        .map(|(i, playlist)| {
            let text = format!("{}  ({})", playlist.name, playlist.total_tracks());
            let style = if i == selected {
                selected_style()
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let title = if pending == 1 {
        " Add to playlist (↑↓ Enter Esc) ".to_string()
    } else {
        format!(" Add {pending} tracks to (↑↓ Enter Esc) ")
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );

    let mut list_state = ListState::default();
    list_state.select(Some(selected));
    frame.render_stateful_widget(list, popup_area, &mut list_state);
}

/// Tracks whose license asks for credit, with the highlighted one's full
/// attribution and source underneath
pub fn render_licenses(frame: &mut Frame, attributed: &[Track], selected: usize) {
    let popup_area = centered_rect(frame.area(), 110, 24);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACID))
        .title(format!(" Attributed tracks ({}) (↑↓ Esc) ", attributed.len()))
        .title_style(Style::default().fg(ACID).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Black));

    if attributed.is_empty() {
        let empty = Paragraph::new("No tracks require attribution")
            .style(Style::default().fg(Color::DarkGray))
            .centered()
            .block(block);
        frame.render_widget(empty, popup_area);
        return;
    }

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(inner);

    let rows: Vec<Row> = attributed
        .iter()
        .map(|track| {
            Row::new(vec![
                Cell::from(track.title.clone()),
                Cell::from(track.artist.clone()),
                Cell::from(track.license.name.clone().unwrap_or_default()),
                Cell::from(track.genre.clone()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(35),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(15),
        ],
    )
    .header(
        Row::new(["Title", "Artist", "License", "Genre"])
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD)),
    )
    .row_highlight_style(selected_style())
    .column_spacing(2);

    let selected = selected.min(attributed.len() - 1);
    let mut state = TableState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(table, chunks[0], &mut state);

    let track = &attributed[selected];
    let mut details = vec![Line::from(vec![
        Span::styled("Attribution: ", Style::default().fg(Color::DarkGray)),
        Span::raw(track.license.attribution.clone().unwrap_or_else(|| "-".to_string())),
    ])];
    if let Some(url) = &track.license.source_url {
        details.push(Line::from(vec![
            Span::styled("Source: ", Style::default().fg(Color::DarkGray)),
            Span::styled(url.clone(), Style::default().fg(Color::Cyan)),
        ]));
    }
    let detail_block = Block::default().borders(Borders::TOP);
    frame.render_widget(
        Paragraph::new(details).wrap(Wrap { trim: true }).block(detail_block),
        chunks[1],
    );
}

/// Single-line text prompt (playlist name, username)
pub fn render_text_prompt(frame: &mut Frame, title: &str, buffer: &str) {
    let popup_area = centered_rect(frame.area(), 48, 3);
    frame.render_widget(Clear, popup_area);

    let prompt = Paragraph::new(Line::from(vec![
        Span::styled(buffer.to_string(), Style::default().fg(Color::White)),
        Span::styled("▏", Style::default().fg(ACCENT)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .title(format!(" {title} (Enter Esc) "))
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(prompt, popup_area);
}

pub fn render_key_hints(frame: &mut Frame, area: Rect) {
    let keybindings = [
        ("1-5", "views"),
        ("/", "search"),
        ("g", "filter"),
        ("←→", "page"),
        ("Enter", "play/open"),
        ("Space", "pause"),
        ("f", "fav"),
        ("a/A", "add"),
        ("c", "new list"),
        ("x", "remove"),
        ("u", "user"),
        ("l", "licenses"),
        ("q", "quit"),
    ];
    let spans: Vec<Span> = keybindings
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(*key, Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
                Span::styled(format!(" {action}  "), Style::default().fg(Color::DarkGray)),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picker_size_stays_in_range_for_huge_names() {
        let huge = Playlist::local("local-1".to_string(), "X".repeat(70_000));
        assert_eq!(picker_width(std::slice::from_ref(&huge)), 60);
        assert_eq!(picker_width(&[]), 36);
        assert_eq!(picker_height(&[]), 5);
    }
}
