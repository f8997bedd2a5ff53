//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared formatting helpers and the pager line
//! - `layout`: Top bar (view tabs, search, status)
//! - `content`: Collection tables and album/artist details
//! - `progress`: Progress bar and active lyric line
//! - `overlays`: Error banner, playlist picker, licenses, text prompts, key hints

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{InputMode, PlaybackSession, Screen, Track, UiState, attributed_tracks};

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        screen: &Screen,
        playback: &PlaybackSession,
        ui_state: &UiState,
        songs: &[Track],
        username: &str,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tabs + search + status
                Constraint::Min(0),    // Main content
                Constraint::Length(4), // Progress bar + lyric line
                Constraint::Length(1), // Key hints
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], screen, ui_state, username);

        let now_playing = playback.track.as_ref().map(|t| t.id.as_str());
        content::render_main_content(frame, chunks[1], screen, ui_state, songs, now_playing);

        progress::render_progress_bar(frame, chunks[2], playback);
        overlays::render_key_hints(frame, chunks[3]);

        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, chunks[1], ui_state);
        }

        if let Some(pending) = &ui_state.playlist_picker {
            overlays::render_playlist_picker(
                frame,
                &screen.playlists,
                pending.len(),
                ui_state.picker_selected,
            );
        }

        if let Some(selected) = ui_state.licenses {
            overlays::render_licenses(frame, &attributed_tracks(songs), selected);
        }

        match &ui_state.input_mode {
            InputMode::PlaylistName(buffer) => {
                overlays::render_text_prompt(frame, "New playlist", buffer)
            }
            InputMode::Username(buffer) => overlays::render_text_prompt(frame, "Username", buffer),
            InputMode::Normal | InputMode::Search => {}
        }
    }
}
