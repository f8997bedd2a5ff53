//! Layout rendering (top bar with view tabs, status strip)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Tabs},
    Frame,
};

use crate::model::{InputMode, Screen, UiState, View, ViewFilter};
use super::utils::{ACCENT, ACID, border_style};

pub fn render_top_bar(
    frame: &mut Frame,
    area: Rect,
    screen: &Screen,
    ui_state: &UiState,
    username: &str,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // View tabs
            Constraint::Length(36), // Filter + search
            Constraint::Length(26), // Backend + user
        ])
        .split(area);

    render_tabs(frame, chunks[0], screen.view);
    render_search(frame, chunks[1], screen, ui_state);
    render_status(frame, chunks[2], screen, ui_state, username);
}

fn render_tabs(frame: &mut Frame, area: Rect, active: View) {
    let titles: Vec<Line> = View::BROWSABLE
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.title())))
        .collect();
    // The playlist detail lives under the playlists tab
    let selected = View::BROWSABLE
        .iter()
        .position(|v| *v == active)
        .unwrap_or(View::BROWSABLE.len() - 1);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .divider(Span::styled("│", Style::default().fg(Color::DarkGray)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    " ACIDWAVE ",
                    Style::default().fg(ACID).add_modifier(Modifier::BOLD),
                )),
        );
    frame.render_widget(tabs, area);
}

fn render_search(frame: &mut Frame, area: Rect, screen: &Screen, ui_state: &UiState) {
    let searching = ui_state.input_mode == InputMode::Search;
    let text = if screen.params.search.is_empty() && !searching {
        Span::styled("/ to search", Style::default().fg(Color::DarkGray))
    } else if searching {
        Span::styled(format!("{}▏", screen.params.search), Style::default().fg(ACCENT))
    } else {
        Span::raw(screen.params.search.clone())
    };

    let filter = match &screen.params.filter {
        ViewFilter::All => " Search ".to_string(),
        other => format!(" Search [{}] ", other.label()),
    };

    let search = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(filter)
            .padding(Padding::horizontal(1))
            .border_style(border_style(searching)),
    );
    frame.render_widget(search, area);
}

fn render_status(
    frame: &mut Frame,
    area: Rect,
    screen: &Screen,
    ui_state: &UiState,
    username: &str,
) {
    let (dot, color) = match ui_state.backend_online {
        Some(true) => ("●", Color::Green),
        Some(false) => ("●", Color::Red),
        None => ("○", Color::DarkGray),
    };
    let mut spans = vec![
        Span::styled(dot, Style::default().fg(color)),
        Span::raw(format!(" {username}")),
    ];
    if screen.using_sample {
        spans.push(Span::styled(" SAMPLE", Style::default().fg(Color::Yellow)));
    }

    let status = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Status ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(status, area);
}
