mod audio;
mod config;
mod controller;
mod errors;
mod logging;
mod model;
mod session;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use view::AppView;
use controller::AppController;
use model::{AcidwaveClient, AppModel, FavoritesCache};
use session::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== ACIDWAVE Starting ===");

    let config = config::load_config();
    tracing::info!(
        api_base_url = %config.api_base_url,
        timeout_secs = config.request_timeout_secs,
        audio_output = config.audio_output,
        "Configuration loaded"
    );

    let audio = audio::open_sink(&config);
    let api = AcidwaveClient::new(&config.api_base_url, config.request_timeout())?;
    let app_model = AppModel::new(FavoritesCache::new(), config.default_volume);
    let model = Arc::new(Mutex::new(app_model));

    let controller = AppController::new(
        model.clone(),
        Arc::new(api),
        audio,
        config,
        SessionStore::new(),
    );

    // Catalog loads run behind the UI; views show loading state until they land
    let controller_for_init = controller.clone();
    tokio::spawn(async move {
        controller_for_init.initialize().await;
    });

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("ACIDWAVE shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        // Sync playback position with the audio sink
        controller.tick().await;

        let (screen, playback, ui_state, songs, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors().await;

            (
                model_guard.get_screen().await,
                model_guard.get_playback().await,
                model_guard.get_ui_state().await,
                model_guard.get_catalog().await.songs,
                model_guard.should_quit().await,
            )
        };
        let session = controller.current_session().await;

        terminal.draw(|f| {
            AppView::render(f, &screen, &playback, &ui_state, &songs, &session.username);
        })?;

        if should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
