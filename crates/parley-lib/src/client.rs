//! HTTP client for a running parley proxy.

use parley_core::types::{AskRequest, AskResponse, SynthesisRequest};

use crate::config::DEFAULT_PORT;
use crate::{Error, Result};

/// Cloneable handle to a proxy at `base_url`.
#[derive(Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for ProxyClient {
    fn default() -> Self {
        Self::new(format!("http://localhost:{DEFAULT_PORT}"))
    }
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /ask`. The reply may be empty; callers decide what to show.
    pub async fn ask(&self, prompt: &str) -> Result<String> {
        let resp = self
            .client
            .post(format!("{}/ask", self.base_url))
            .json(&AskRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await?;
        let resp = Error::check(resp).await?;
        let body: AskResponse = serde_json::from_slice(&resp.bytes().await?)?;
        Ok(body.reply)
    }

    /// `POST /api/tts`. Returns the MP3 payload.
    pub async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<Vec<u8>> {
        let resp = self
            .client
            .post(format!("{}/api/tts", self.base_url))
            .json(&SynthesisRequest {
                text: text.to_string(),
                voice_name: voice.map(str::to_string),
            })
            .send()
            .await?;
        let resp = Error::check(resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}
