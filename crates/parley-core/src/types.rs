//! Shared types for the parley chat proxy and client.
//!
//! Wire bodies for the proxy API live here so the server and the terminal
//! client agree on field names without either pulling in the other's deps.

use serde::{Deserialize, Serialize};

/// Voice used when a synthesis request does not name one.
pub const DEFAULT_VOICE: &str = "en-US-JennyNeural";

/// Shown in place of a reply when the proxy call fails.
pub const APOLOGY: &str = "Oops, something went wrong.";

/// Shown when the proxy answers with an empty reply.
pub const EMPTY_REPLY: &str = "Error: No response.";

// ─── Transcript ────────────────────────────────────────────────────────────

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One chat bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Display string, local `HH:MM`.
    pub timestamp: String,
}

impl Message {
    /// Message stamped with the current local time.
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: time_now(),
        }
    }
}

/// Current local time formatted for bubbles.
pub fn time_now() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

/// Append-only, in-memory list of messages.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ─── Proxy wire types ──────────────────────────────────────────────────────

/// `POST /ask` body. A missing prompt is forwarded as empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub prompt: String,
}

/// `POST /ask` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub reply: String,
}

/// `POST /api/tts` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,
}

impl SynthesisRequest {
    /// Voice to synthesize with, falling back to [`DEFAULT_VOICE`].
    pub fn voice(&self) -> &str {
        self.voice_name.as_deref().unwrap_or(DEFAULT_VOICE)
    }
}
