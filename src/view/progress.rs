//! Progress bar rendering with the active lyric line

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::model::{PlaybackSession, TransportState};
use super::utils::{ACCENT, ACID, format_position};

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackSession) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let status_text = match (&playback.track, playback.state) {
        (None, _) => " No track playing".to_string(),
        (Some(track), TransportState::Playing) => {
            format!(" ▶ {} | {} ({})", track.title, track.artist, track.album)
        }
        (Some(track), _) => format!("⏸  {} | {} ({})", track.title, track.artist, track.album),
    };

    let time_str = format!(
        "{} / {}",
        format_position(playback.position_secs),
        format_position(playback.duration_secs)
    );
    let progress_ratio = if playback.duration_secs > 0.0 {
        (playback.position_secs / playback.duration_secs).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let queue_text = if playback.queue.is_empty() {
        String::new()
    } else {
        format!("Queue: {} | ", playback.queue.tracks.len())
    };
    let controls_info = format!(
        " {}Vol: {}% | [ ] seek  n/p skip ",
        queue_text,
        (playback.volume * 100.0).round() as u32
    );

    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} ", status_text))
        .title_bottom(Line::from(controls_info).right_aligned());
    if let Some(credit) = playback.track.as_ref().and_then(|t| t.license.credit_line()) {
        block = block.title_bottom(
            Line::from(Span::styled(format!(" {credit} "), Style::default().fg(Color::DarkGray)))
                .left_aligned(),
        );
    }

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(ACCENT))
        .ratio(progress_ratio)
        .label(time_str);
    frame.render_widget(gauge, chunks[0]);

    let lyric = match playback.active_lyric_line() {
        Some(line) => Span::styled(
            line.text.clone(),
            Style::default().fg(ACID).add_modifier(Modifier::BOLD),
        ),
        None if playback.track.is_some() => Span::styled("♪", Style::default().fg(Color::DarkGray)),
        None => Span::raw(""),
    };
    frame.render_widget(Paragraph::new(Line::from(lyric).centered()), chunks[1]);
}
