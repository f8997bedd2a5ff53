//! Application configuration, stored with `confy` under the `acidwave` name.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "acidwave";
const API_URL_ENV: &str = "ACIDWAVE_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    /// Base URL of the REST API, including the `/api` prefix
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Songs requested for the catalog; the backend pages at 50 otherwise
    pub song_fetch_limit: u32,
    pub artist_fetch_limit: u32,
    pub default_volume: f64,
    /// Stream tracks to the sound device; off keeps the wall-clock transport
    pub audio_output: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            api_base_url: "http://localhost:3000/api".to_string(),
            request_timeout_secs: 30,
            song_fetch_limit: 500,
            artist_fetch_limit: 200,
            default_volume: 0.5,
            audio_output: true,
        }
    }
}

impl AppConfig {
    fn with_env_overrides(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        self.default_volume = self.default_volume.clamp(0.0, 1.0);
        self.request_timeout_secs = self.request_timeout_secs.max(1);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn load_config() -> AppConfig {
    let config: AppConfig = match confy::load(CONFIG_NAME, None) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Could not load config, using defaults");
            AppConfig::default()
        }
    };
    config.with_env_overrides(std::env::var(API_URL_ENV).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_url_overrides_base_url() {
        let config = AppConfig::default()
            .with_env_overrides(Some("https://api.example.com/api/".to_string()));
        assert_eq!(config.api_base_url, "https://api.example.com/api");
    }

    #[test]
    fn blank_env_url_is_ignored() {
        let config = AppConfig::default().with_env_overrides(Some("  ".to_string()));
        assert_eq!(config.api_base_url, AppConfig::default().api_base_url);
    }

    #[test]
    fn volume_is_clamped() {
        let config = AppConfig {
            default_volume: 3.0,
            ..AppConfig::default()
        }
        .with_env_overrides(None);
        assert_eq!(config.default_volume, 1.0);
    }
}
