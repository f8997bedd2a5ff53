//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{InputMode, View};
use super::AppController;
use super::playback::{SEEK_STEP_SECS, VOLUME_STEP};

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // Ctrl+C quits from any mode
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.model.lock().await.set_should_quit(true).await;
            return Ok(());
        }

        let mode = self.model.lock().await.input_mode().await;
        match mode {
            InputMode::Search => self.handle_search_key(key).await,
            InputMode::PlaylistName(buffer) => self.handle_playlist_name_key(key, buffer).await,
            InputMode::Username(buffer) => self.handle_username_key(key, buffer).await,
            InputMode::Normal => {
                if self.model.lock().await.is_licenses_open().await {
                    self.handle_licenses_key(key).await;
                } else if self.model.lock().await.is_picker_open().await {
                    self.handle_picker_key(key).await;
                } else {
                    self.handle_normal_key(key).await;
                }
            }
        }
        Ok(())
    }

    /// Typing edits the active view's search text live; Enter or Esc stops typing.
    async fn handle_search_key(&self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.model.lock().await.set_input_mode(InputMode::Normal).await;
            }
            KeyCode::Backspace => self.search_backspace().await,
            KeyCode::Char(c) => self.search_input(c).await,
            _ => {}
        }
    }

    async fn handle_playlist_name_key(&self, key: KeyEvent, mut buffer: String) {
        match key.code {
            KeyCode::Enter => {
                self.model.lock().await.set_input_mode(InputMode::Normal).await;
                self.create_playlist(&buffer).await;
            }
            KeyCode::Esc => {
                self.model.lock().await.set_input_mode(InputMode::Normal).await;
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.model.lock().await.set_input_mode(InputMode::PlaylistName(buffer)).await;
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                self.model.lock().await.set_input_mode(InputMode::PlaylistName(buffer)).await;
            }
            _ => {}
        }
    }

    async fn handle_username_key(&self, key: KeyEvent, mut buffer: String) {
        match key.code {
            KeyCode::Enter => {
                self.model.lock().await.set_input_mode(InputMode::Normal).await;
                self.sign_in(&buffer).await;
            }
            KeyCode::Esc => {
                self.model.lock().await.set_input_mode(InputMode::Normal).await;
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.model.lock().await.set_input_mode(InputMode::Username(buffer)).await;
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                self.model.lock().await.set_input_mode(InputMode::Username(buffer)).await;
            }
            _ => {}
        }
    }

    async fn handle_picker_key(&self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false).await,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true).await,
            KeyCode::Enter => self.confirm_playlist_picker().await,
            KeyCode::Esc | KeyCode::Char('q') => self.go_back().await,
            _ => {}
        }
    }

    async fn handle_licenses_key(&self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false).await,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true).await,
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('l') | KeyCode::Char('L') => {
                self.go_back().await
            }
            _ => {}
        }
    }

    async fn handle_normal_key(&self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.model.lock().await.set_should_quit(true).await;
            }

            // Views
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                if let Some(view) = View::BROWSABLE.get(index) {
                    self.switch_view(*view).await;
                }
            }
            KeyCode::Tab => {
                let view = self.model.lock().await.active_view().await;
                self.switch_view(view.next()).await;
            }
            KeyCode::BackTab => {
                let view = self.model.lock().await.active_view().await;
                self.switch_view(view.prev()).await;
            }
            KeyCode::Esc | KeyCode::Backspace => self.go_back().await,

            // Filter, search and paging
            KeyCode::Char('/') => self.start_search().await,
            KeyCode::Char('g') | KeyCode::Char('G') => self.cycle_filter().await,
            KeyCode::Left => self.change_page(false).await,
            KeyCode::Right => self.change_page(true).await,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false).await,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true).await,
            KeyCode::Enter => self.activate_selected().await,

            // Transport
            KeyCode::Char(' ') => self.toggle_playback().await,
            KeyCode::Char('n') | KeyCode::Char('N') => self.next_track().await,
            KeyCode::Char('p') | KeyCode::Char('P') => self.previous_track().await,
            KeyCode::Char('+') | KeyCode::Char('=') => self.change_volume(VOLUME_STEP).await,
            KeyCode::Char('-') => self.change_volume(-VOLUME_STEP).await,
            KeyCode::Char('[') => self.seek_relative(-SEEK_STEP_SECS).await,
            KeyCode::Char(']') => self.seek_relative(SEEK_STEP_SECS).await,

            // Library edits
            KeyCode::Char('f') | KeyCode::Char('F') => {
                self.toggle_favorite_selected().await;
            }
            KeyCode::Char('a') => self.pick_playlist_for_selection(false).await,
            KeyCode::Char('A') => self.pick_playlist_for_selection(true).await,
            KeyCode::Char('x') | KeyCode::Char('X') => self.remove_selected().await,
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.model
                    .lock()
                    .await
                    .set_input_mode(InputMode::PlaylistName(String::new()))
                    .await;
            }

            // Session
            KeyCode::Char('u') => {
                self.model
                    .lock()
                    .await
                    .set_input_mode(InputMode::Username(String::new()))
                    .await;
            }
            KeyCode::Char('U') => self.sign_out().await,

            KeyCode::Char('r') | KeyCode::Char('R') => self.retry_catalog().await,
            KeyCode::Char('l') | KeyCode::Char('L') => self.toggle_licenses().await,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::super::test_support::{FakeApi, loaded_controller};
    use crate::model::{InputMode, View};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_text(controller: &super::AppController, text: &str) {
        for c in text.chars() {
            controller.handle_key_event(press(KeyCode::Char(c))).await.expect("key");
        }
    }

    #[tokio::test]
    async fn number_keys_switch_views() {
        let controller = loaded_controller(Arc::new(FakeApi::default())).await;
        controller.handle_key_event(press(KeyCode::Char('3'))).await.expect("key");
        assert_eq!(controller.model.lock().await.active_view().await, View::Artists);
        controller.handle_key_event(press(KeyCode::Char('1'))).await.expect("key");
        assert_eq!(controller.model.lock().await.active_view().await, View::Songs);
    }

    #[tokio::test]
    async fn search_mode_captures_letters() {
        let controller = loaded_controller(Arc::new(FakeApi::default())).await;
        controller.handle_key_event(press(KeyCode::Char('1'))).await.expect("key");
        controller.handle_key_event(press(KeyCode::Char('/'))).await.expect("key");
        // 'q' is text here, not quit
        type_text(&controller, "neq").await;
        controller.handle_key_event(press(KeyCode::Backspace)).await.expect("key");
        controller.handle_key_event(press(KeyCode::Enter)).await.expect("key");

        let model = controller.model.lock().await;
        assert_eq!(model.view_params(View::Songs).await.search, "ne");
        assert_eq!(model.input_mode().await, InputMode::Normal);
        assert!(!model.should_quit().await);
    }

    #[tokio::test]
    async fn playlist_name_prompt_creates_playlist() {
        let api = Arc::new(FakeApi::default());
        let controller = loaded_controller(api.clone()).await;
        controller.handle_key_event(press(KeyCode::Char('c'))).await.expect("key");
        type_text(&controller, "late set").await;
        controller.handle_key_event(press(KeyCode::Enter)).await.expect("key");

        let model = controller.model.lock().await;
        assert_eq!(model.input_mode().await, InputMode::Normal);
        assert_eq!(model.get_catalog().await.playlists[0].name, "LATE_SET");
    }

    #[tokio::test]
    async fn username_prompt_signs_in() {
        let controller = loaded_controller(Arc::new(FakeApi::default())).await;
        controller.handle_key_event(press(KeyCode::Char('u'))).await.expect("key");
        type_text(&controller, "neo").await;
        controller.handle_key_event(press(KeyCode::Enter)).await.expect("key");
        assert_eq!(controller.current_session().await.username, "neo");

        controller.handle_key_event(press(KeyCode::Char('U'))).await.expect("key");
        assert!(controller.current_session().await.is_guest());
    }

    #[tokio::test]
    async fn licenses_overlay_keeps_q_from_quitting() {
        let controller = loaded_controller(Arc::new(FakeApi::default())).await;
        controller.handle_key_event(press(KeyCode::Char('l'))).await.expect("key");
        assert!(controller.model.lock().await.is_licenses_open().await);

        controller.handle_key_event(press(KeyCode::Char('q'))).await.expect("key");
        let model = controller.model.lock().await;
        assert!(!model.is_licenses_open().await);
        assert!(!model.should_quit().await);
    }

    #[tokio::test]
    async fn q_quits_in_normal_mode() {
        let controller = loaded_controller(Arc::new(FakeApi::default())).await;
        controller.handle_key_event(press(KeyCode::Char('q'))).await.expect("key");
        assert!(controller.model.lock().await.should_quit().await);
    }
}
