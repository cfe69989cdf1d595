//! Proxy configuration, read from the environment.
//!
//! Recognized variables:
//!
//! | variable            | meaning                                      |
//! |---------------------|----------------------------------------------|
//! | `AZURE_AI_ENDPOINT` | completion resource endpoint                 |
//! | `AZURE_AI_KEY`      | optional `api-key` for the completion API    |
//! | `AZURE_REGION`      | speech region, e.g. `eastus`                 |
//! | `AZURE_SPEECH_KEY`  | speech subscription key                      |
//!
//! Missing values don't stop the server from starting; requests that need
//! them fail with the usual generic 500.

use tracing::{debug, warn};

pub const ENV_AI_ENDPOINT: &str = "AZURE_AI_ENDPOINT";
pub const ENV_AI_KEY: &str = "AZURE_AI_KEY";
pub const ENV_REGION: &str = "AZURE_REGION";
pub const ENV_SPEECH_KEY: &str = "AZURE_SPEECH_KEY";

/// Deployment the completion proxy always targets.
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";
pub const DEFAULT_API_VERSION: &str = "2024-10-21";

pub const DEFAULT_OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";
pub const DEFAULT_USER_AGENT: &str = "parley";

/// Port the proxy listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 3001;

/// Completion upstream settings.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment: String,
    pub api_version: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            deployment: DEFAULT_DEPLOYMENT.into(),
            api_version: DEFAULT_API_VERSION.into(),
        }
    }
}

/// Speech upstream settings.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Full synthesis URL, usually derived from the region.
    pub endpoint: Option<String>,
    pub key: Option<String>,
    pub output_format: String,
    pub user_agent: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            key: None,
            output_format: DEFAULT_OUTPUT_FORMAT.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

/// Everything the proxy needs to reach its upstreams.
#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    pub completion: CompletionConfig,
    pub speech: SpeechConfig,
}

impl ProxyConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let completion = CompletionConfig {
            endpoint: get(ENV_AI_ENDPOINT),
            api_key: get(ENV_AI_KEY),
            ..Default::default()
        };
        let speech = SpeechConfig {
            endpoint: get(ENV_REGION).map(|region| speech_endpoint(&region)),
            key: get(ENV_SPEECH_KEY),
            ..Default::default()
        };

        let config = Self { completion, speech };
        config.warn_missing();
        config
    }

    fn warn_missing(&self) {
        if self.completion.endpoint.is_none() {
            warn!("{ENV_AI_ENDPOINT} not set; /ask will fail");
        }
        if self.speech.endpoint.is_none() {
            warn!("{ENV_REGION} not set; /api/tts will fail");
        }
        if self.speech.key.is_none() {
            warn!("{ENV_SPEECH_KEY} not set; /api/tts will fail");
        }
    }
}

/// Synthesis URL for a speech region.
pub fn speech_endpoint(region: &str) -> String {
    format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1")
}

/// Load a `.env` file from the working directory (or a parent), if any.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("ignoring unreadable .env: {e}"),
    }
}
