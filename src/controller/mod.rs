//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model, the backend gateway and the audio sink.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `loading`: Catalog loads, fallbacks and detail refreshes
//! - `playback`: Transport control, play queue and lyric tracking
//! - `navigation`: Views, filters, search, paging and favorites
//! - `playlists`: Optimistic playlist mutations mirrored to the backend
//! - `mirror`: Ordered worker that replays local edits on the backend

mod input;
mod loading;
mod mirror;
mod playback;
mod navigation;
mod playlists;

#[cfg(test)]
mod test_support;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audio::AudioSink;
use crate::config::AppConfig;
use crate::errors::GatewayError;
use crate::model::{AppModel, CatalogApi};
use crate::session::{Session, SessionStore};

use mirror::{MirrorHandle, MirrorQueue};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) api: Arc<dyn CatalogApi>,
    pub(crate) audio: Arc<Mutex<Box<dyn AudioSink>>>,
    pub(crate) config: Arc<AppConfig>,
    pub(crate) session: Arc<Mutex<Session>>,
    session_store: SessionStore,
    mirrors: MirrorQueue,
    /// Server ids adopted by playlists created in this session, by local id.
    /// Kept after a local delete so a queued remote delete can still find them.
    adopted_ids: Arc<Mutex<HashMap<String, String>>>,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        api: Arc<dyn CatalogApi>,
        audio: Box<dyn AudioSink>,
        config: AppConfig,
        session_store: SessionStore,
    ) -> Self {
        let session = session_store.load();
        Self {
            model,
            api,
            audio: Arc::new(Mutex::new(audio)),
            config: Arc::new(config),
            session: Arc::new(Mutex::new(session)),
            session_store,
            mirrors: MirrorQueue::start(),
            adopted_ids: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub(crate) async fn user_id(&self) -> String {
        self.session.lock().await.user_id().to_string()
    }

    pub async fn current_session(&self) -> Session {
        self.session.lock().await.clone()
    }

    /// Switches the local profile and reseeds favorites for it
    pub async fn sign_in(&self, username: &str) {
        let Some(session) = Session::sign_in(username, None) else {
            self.model.lock().await.set_error("Username cannot be empty".to_string()).await;
            return;
        };
        if let Err(e) = self.session_store.save(&session) {
            tracing::warn!(error = %e, "Could not persist session");
        }
        tracing::info!(username = %session.username, "Signed in");
        *self.session.lock().await = session;
        self.switch_favorites().await;
        self.load_favorites().await;
    }

    pub async fn sign_out(&self) {
        if self.session.lock().await.is_guest() {
            return;
        }
        if let Err(e) = self.session_store.clear() {
            tracing::warn!(error = %e, "Could not remove saved session");
        }
        *self.session.lock().await = Session::guest();
        tracing::info!("Signed out, continuing as guest");
        self.switch_favorites().await;
        self.load_favorites().await;
    }

    /// Gives the favorites set to the current session's user
    pub(crate) async fn switch_favorites(&self) {
        let user_id = self.user_id().await;
        if let Err(e) = self.model.lock().await.switch_favorites_user(&user_id).await {
            tracing::warn!(user_id = %user_id, error = %e, "Could not read cached favorites");
        }
    }

    /// Queues a backend mirror call behind earlier ones. Failures are logged and
    /// never touch local state.
    pub(crate) fn mirror<F>(&self, operation: &'static str, call: F) -> MirrorHandle
    where
        F: Future<Output = Result<(), GatewayError>> + Send + 'static,
    {
        self.mirrors.push(operation, call)
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        match error.downcast_ref::<GatewayError>() {
            Some(GatewayError::Transport(_)) => {
                "Cannot reach the ACIDWAVE backend. Check that the API server is running.".to_string()
            }
            Some(GatewayError::Status { status: 404, .. }) => "Not found on the server.".to_string(),
            Some(GatewayError::Status { status, .. }) if *status >= 500 => {
                format!("Server error ({status}). Try again in a moment.")
            }
            Some(GatewayError::Status { message, .. }) => message.clone(),
            Some(GatewayError::Decode(_)) => "Unexpected response from the server.".to_string(),
            None => format!("Error: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{FakeApi, loaded_controller};
    use super::*;

    #[test]
    fn gateway_errors_get_friendly_messages() {
        let transport = anyhow::Error::from(GatewayError::Transport("refused".into()));
        assert!(AppController::format_error(&transport).contains("Cannot reach"));

        let server = anyhow::Error::from(GatewayError::Status {
            status: 503,
            message: "down".into(),
        });
        assert!(AppController::format_error(&server).contains("503"));

        let bad_request = anyhow::Error::from(GatewayError::Status {
            status: 400,
            message: "Name is required".into(),
        });
        assert_eq!(AppController::format_error(&bad_request), "Name is required");

        let other = anyhow::anyhow!("disk full");
        assert_eq!(AppController::format_error(&other), "Error: disk full");
    }

    #[tokio::test]
    async fn favorites_follow_the_signed_in_user() {
        let api = Arc::new(FakeApi::default());
        let controller = loaded_controller(api.clone()).await;
        controller.toggle_favorite("3").await.expect("known").await.expect("mirror");

        controller.sign_in("bob").await;
        assert!(!controller.model.lock().await.is_favorite("3").await);
        controller.toggle_favorite("5").await.expect("known").await.expect("mirror");
        assert!(api.calls().contains(&"add_favorite 5 bob".to_string()));
        assert!(!api.calls().iter().any(|c| c.starts_with("remove_favorite")));

        controller.sign_out().await;
        let model = controller.model.lock().await;
        assert!(model.is_favorite("3").await);
        assert!(!model.is_favorite("5").await);
    }
}
