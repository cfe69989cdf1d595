//! Shared helpers: an in-process fake of the hosted completion and speech
//! APIs, and a way to run routers on ephemeral ports.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use parley_lib::config::{CompletionConfig, ProxyConfig, SpeechConfig};

pub const AI_KEY: &str = "test-ai-key";
pub const SPEECH_KEY: &str = "test-speech-key";
pub const FAKE_MP3: &[u8] = b"ID3\x04\x00fake-mp3-payload";

/// Prompt the fake model answers with empty content.
pub const SILENT_PROMPT: &str = "say nothing";

/// What the fake upstream saw.
#[derive(Clone, Default)]
pub struct Recorded {
    pub ssml: Arc<Mutex<Vec<String>>>,
    pub api_versions: Arc<Mutex<Vec<String>>>,
}

#[derive(Deserialize)]
struct ApiVersion {
    #[serde(rename = "api-version")]
    api_version: String,
}

/// Fake completion + speech upstream that behaves.
pub fn healthy_upstream(recorded: Recorded) -> Router {
    Router::new()
        .route(
            "/openai/deployments/gpt-4o/chat/completions",
            post(fake_completion),
        )
        .route("/tts", post(fake_speech))
        .with_state(recorded)
}

/// Fake upstream that rejects everything, like a bad key would.
pub fn failing_upstream() -> Router {
    Router::new().fallback(|| async { (StatusCode::UNAUTHORIZED, "invalid key") })
}

/// Speech works but the model rejects every call.
pub fn speech_only_upstream(recorded: Recorded) -> Router {
    Router::new()
        .route("/tts", post(fake_speech))
        .fallback(|| async { (StatusCode::UNAUTHORIZED, "invalid key") })
        .with_state(recorded)
}

async fn fake_completion(
    State(recorded): State<Recorded>,
    Query(q): Query<ApiVersion>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    recorded.api_versions.lock().unwrap().push(q.api_version);

    if headers.get("api-key").and_then(|v| v.to_str().ok()) != Some(AI_KEY) {
        return (StatusCode::UNAUTHORIZED, "missing api-key").into_response();
    }

    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    let content = if prompt == SILENT_PROMPT {
        String::new()
    } else {
        format!("echo: {prompt}")
    };

    Json(serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
    .into_response()
}

async fn fake_speech(State(recorded): State<Recorded>, headers: HeaderMap, body: Bytes) -> Response {
    let get = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default();

    if get("Ocp-Apim-Subscription-Key") != SPEECH_KEY {
        return (StatusCode::UNAUTHORIZED, "bad key").into_response();
    }
    if get("content-type") != "application/ssml+xml"
        || get("X-Microsoft-OutputFormat") != "audio-24khz-48kbitrate-mono-mp3"
    {
        return (StatusCode::BAD_REQUEST, "bad headers").into_response();
    }

    recorded
        .ssml
        .lock()
        .unwrap()
        .push(String::from_utf8_lossy(&body).into_owned());

    ([(header::CONTENT_TYPE, "audio/mpeg")], FAKE_MP3).into_response()
}

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Proxy config pointing both upstreams at `base`.
pub fn proxy_config(base: &str) -> ProxyConfig {
    ProxyConfig {
        completion: CompletionConfig {
            endpoint: Some(base.to_string()),
            api_key: Some(AI_KEY.to_string()),
            ..Default::default()
        },
        speech: SpeechConfig {
            endpoint: Some(format!("{base}/tts")),
            key: Some(SPEECH_KEY.to_string()),
            ..Default::default()
        },
    }
}
