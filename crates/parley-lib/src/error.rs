//! Error types for parley.

use thiserror::Error;

/// Result type alias for parley operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to upstreams, the proxy, or the audio device.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Non-success HTTP status from an upstream or the proxy
    #[error("upstream returned {status}: {body}")]
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Transport error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Decode or playback error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Turn a non-success response into [`Error::Upstream`], passing
    /// successful ones through.
    pub(crate) async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Self::Upstream { status, body })
    }
}
