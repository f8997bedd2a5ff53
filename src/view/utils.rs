//! Utility functions for rendering UI components

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::model::{PageLabel, page_labels};

pub const ACCENT: Color = Color::Green;
pub const ACID: Color = Color::LightMagenta;

/// `m:ss` for a duration in whole seconds
pub fn format_duration(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn format_position(secs: f64) -> String {
    format_duration(secs.max(0.0).floor() as u32)
}

/// Calculate width needed for index column (log10(n) + padding)
pub fn calculate_num_width(item_count: usize) -> usize {
    if item_count == 0 {
        2
    } else {
        let digits = (item_count as f64).log10().floor() as usize + 1;
        digits + 1
    }
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

pub fn rating_stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default()
    }
}

pub fn selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

/// Pager line: `‹ 1 … 4 [5] 6 … 12 ›`
pub fn pager_line(current: usize, total: usize) -> Line<'static> {
    let mut spans = vec![Span::styled("‹ ", Style::default().fg(Color::DarkGray))];
    for label in page_labels(current, total) {
        match label {
            PageLabel::Number(n) if n == current => spans.push(Span::styled(
                format!("[{n}] "),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )),
            PageLabel::Number(n) => spans.push(Span::raw(format!("{n} "))),
            PageLabel::Ellipsis => {
                spans.push(Span::styled("… ", Style::default().fg(Color::DarkGray)))
            }
        }
    }
    spans.push(Span::styled("›", Style::default().fg(Color::DarkGray)));
    Line::from(spans).centered()
}

/// Centered rectangle of at most `width` by `height` inside `area`
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

/// Splits off a one-line strip at the bottom of `area` for the pager
pub fn split_pager(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}
