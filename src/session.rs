//! Local user profile, persisted between runs. No credentials are ever stored.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const CURRENT_USER_FILE: &str = ".cache/current_user.json";
pub const GUEST_USER: &str = "guest";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn guest() -> Self {
        Self {
            username: GUEST_USER.to_string(),
            email: None,
            avatar: None,
            signed_in_at: Utc::now(),
        }
    }

    /// Builds a profile for `username`, rejecting blank names.
    pub fn sign_in(username: &str, email: Option<String>) -> Option<Self> {
        let username = username.trim();
        if username.is_empty() {
            return None;
        }
        Some(Self {
            username: username.to_string(),
            email: email.filter(|e| !e.trim().is_empty()),
            avatar: None,
            signed_in_at: Utc::now(),
        })
    }

    pub fn is_guest(&self) -> bool {
        self.username == GUEST_USER
    }

    /// Id sent as `user_id` to the favorites routes
    pub fn user_id(&self) -> &str {
        &self.username
    }
}

/// Reads and writes the current profile file
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_path(CURRENT_USER_FILE)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The saved profile, or a guest session when none is saved or it is unreadable.
    pub fn load(&self) -> Session {
        match self.read() {
            Ok(Some(session)) => {
                tracing::info!(username = %session.username, "Restored session");
                session
            }
            Ok(None) => Session::guest(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read saved session, continuing as guest");
                Session::guest()
            }
        }
    }

    fn read(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        tracing::debug!(username = %session.username, "Saved session");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(name: &str) -> SessionStore {
        SessionStore::with_path(
            std::env::temp_dir()
                .join(format!("acidwave-session-{}-{}", std::process::id(), name))
                .join("current_user.json"),
        )
    }

    #[test]
    fn missing_file_means_guest() {
        let session = store("missing").load();
        assert!(session.is_guest());
        assert_eq!(session.user_id(), GUEST_USER);
    }

    #[test]
    fn saved_profile_is_restored_without_credentials() {
        let store = store("roundtrip");
        let session = Session::sign_in("  neo ", Some("neo@zion.io".into())).expect("valid name");
        store.save(&session).expect("save");

        let raw = fs::read_to_string(store.path.as_path()).expect("file written");
        assert!(!raw.contains("password"));
        assert_eq!(store.load(), session);

        store.clear().expect("clear");
        assert!(store.load().is_guest());
        let _ = fs::remove_dir_all(store.path.as_path().parent().expect("has parent"));
    }

    #[test]
    fn blank_username_is_rejected() {
        assert!(Session::sign_in("   ", None).is_none());
    }

    #[test]
    fn corrupt_file_falls_back_to_guest() {
        let store = store("corrupt");
        let dir = store.path.as_path().parent().expect("has parent").to_path_buf();
        fs::create_dir_all(&dir).expect("dir");
        fs::write(store.path.as_path(), "{not json").expect("write");
        assert!(store.load().is_guest());
        let _ = fs::remove_dir_all(dir);
    }
}
