use thiserror::Error;

/// Failures raised at the boundary with the REST backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The server answered with a non-2xx status or `success: false`
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            GatewayError::Status {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Decode(e.to_string())
    }
}

/// Failures of the streamed audio output
#[cfg(feature = "stream-audio")]
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("No audio output device")]
    NoDevice,

    #[error("Audio output failed: {0}")]
    Output(String),

    #[error("Could not fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Could not decode stream: {0}")]
    Decode(String),
}
