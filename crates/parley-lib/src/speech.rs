//! Speech synthesis upstream: SSML in, MP3 out.

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use tracing::debug;

use parley_core::text_prep::build_ssml;

use crate::config::SpeechConfig;
use crate::{Error, Result};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";
const SSML_CONTENT_TYPE: &str = "application/ssml+xml";

/// Cloneable handle to the speech upstream.
#[derive(Clone)]
pub struct SpeechClient {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl SpeechClient {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Start synthesis and hand back the successful response unread, so the
    /// caller can stream its body.
    ///
    /// Missing config, transport errors, and non-2xx statuses fail here;
    /// anything after the headers surfaces while reading the body.
    pub async fn start(&self, text: &str, voice: &str) -> Result<reqwest::Response> {
        let url = self
            .config
            .endpoint
            .as_deref()
            .ok_or_else(|| Error::Config("speech region not set".into()))?;
        let key = self
            .config
            .key
            .as_deref()
            .ok_or_else(|| Error::Config("speech key not set".into()))?;

        let ssml = build_ssml(text, voice);
        debug!("speech: POST {} chars as {voice}", text.len());

        let resp = self
            .client
            .post(url)
            .header(SUBSCRIPTION_KEY_HEADER, key)
            .header(CONTENT_TYPE, SSML_CONTENT_TYPE)
            .header(OUTPUT_FORMAT_HEADER, &self.config.output_format)
            .header(USER_AGENT, &self.config.user_agent)
            .body(ssml)
            .send()
            .await?;

        Error::check(resp).await
    }
}
