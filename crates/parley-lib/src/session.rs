//! Chat session: the client side of one conversation.
//!
//! Holds the transcript and turns each line of user input into at most two
//! messages. Requests go out one at a time, so the transcript order is the
//! submission order. Every assistant message is spoken, the apology included.

use tracing::error;

use parley_core::text_prep::is_exit_command;
use parley_core::types::{Message, Role, Transcript, APOLOGY, EMPTY_REPLY};

use crate::client::ProxyClient;
use crate::speaker::fetch_speech;
use crate::Result;

/// What a call to [`ChatSession::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Blank input; nothing happened.
    Ignored,
    /// The user typed `exit`. Nothing was appended.
    Exited,
    /// A user message and this assistant message were appended.
    Replied(Message),
}

impl Outcome {
    /// Text to hand to synthesis for this outcome.
    pub fn speech(&self) -> Option<&str> {
        match self {
            Outcome::Replied(reply) => Some(&reply.content),
            Outcome::Ignored | Outcome::Exited => None,
        }
    }
}

pub struct ChatSession {
    client: ProxyClient,
    voice: Option<String>,
    transcript: Transcript,
    exited: bool,
}

impl ChatSession {
    pub fn new(client: ProxyClient) -> Self {
        Self {
            client,
            voice: None,
            transcript: Transcript::new(),
            exited: false,
        }
    }

    /// Voice for [`speak`](Self::speak); the proxy default when unset.
    pub fn with_voice(mut self, voice: Option<String>) -> Self {
        self.voice = voice;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    /// Handle one line of input.
    ///
    /// Proxy failures never escape: the assistant turn becomes
    /// [`APOLOGY`] and is returned like any other reply.
    pub async fn submit(&mut self, input: &str) -> Outcome {
        if self.exited {
            return Outcome::Exited;
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Outcome::Ignored;
        }
        if is_exit_command(trimmed) {
            self.exited = true;
            return Outcome::Exited;
        }

        self.transcript.push(Message::now(Role::User, trimmed));

        let content = match self.client.ask(trimmed).await {
            Ok(reply) if reply.is_empty() => EMPTY_REPLY.to_string(),
            Ok(reply) => reply,
            Err(e) => {
                error!("backend call failed: {e}");
                APOLOGY.to_string()
            }
        };

        let reply = Message::now(Role::Assistant, content);
        self.transcript.push(reply.clone());
        Outcome::Replied(reply)
    }

    /// Synthesize the audio for `outcome`.
    ///
    /// `Ok(None)` when there is nothing to say: blank input, exit, or a
    /// reply made only of emojis.
    pub async fn speak(&self, outcome: &Outcome) -> Result<Option<Vec<u8>>> {
        match outcome.speech() {
            Some(text) => fetch_speech(&self.client, text, self.voice.as_deref()).await,
            None => Ok(None),
        }
    }
}
