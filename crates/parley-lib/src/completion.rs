//! Chat completion upstream: one prompt in, one reply out.
//!
//! Speaks the Azure OpenAI chat completions dialect with a single user
//! message per call. No history, no retries, no streaming.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CompletionConfig;
use crate::{Error, Result};

/// Reply used when the upstream answers without any choice content.
pub const NO_RESPONSE: &str = "No response";

/// Cloneable handle to the completion upstream.
#[derive(Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    config: CompletionConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Full chat completions URL for the configured deployment.
    pub fn url(&self) -> Result<String> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or_else(|| Error::Config("completion endpoint not set".into()))?;
        Ok(format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version,
        ))
    }

    /// Send `prompt` as a single user message and return the first choice.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let url = self.url()?;
        let body = ChatRequest {
            model: &self.config.deployment,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!("completion: POST {} chars to {}", prompt.len(), self.config.deployment);

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            req = req.header("api-key", key);
        }

        let resp = Error::check(req.send().await?).await?;
        let bytes = resp.bytes().await?;
        extract_reply(&bytes).map_err(Error::from)
    }
}

/// Pull the first choice's content out of a chat completions body.
fn extract_reply(body: &[u8]) -> serde_json::Result<String> {
    let parsed: ChatResponse = serde_json::from_slice(body)?;
    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_else(|| NO_RESPONSE.to_string()))
}
