//! HTTP API for the parley proxy.
//!
//! Runs on port 3001 by default. CORS-permissive so a browser front end on
//! another origin can call it.
//!
//! Every failure collapses to a plain-text 500; the cause is only logged.
//! That includes unreadable request bodies: bodies are parsed by hand so a
//! missing field or content type never turns into a 4xx.

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures_util::TryStreamExt;
use tower_http::cors::CorsLayer;
use tracing::{debug, error};

use parley_core::types::{AskRequest, AskResponse, SynthesisRequest};

use crate::completion::CompletionClient;
use crate::config::ProxyConfig;
use crate::speech::SpeechClient;

pub const ASK_FAILED: &str = "Failed to get response";
pub const TTS_FAILED: &str = "Azure TTS failed";

/// Shared handler state: one client per upstream.
#[derive(Clone)]
pub struct ProxyState {
    pub completion: CompletionClient,
    pub speech: SpeechClient,
}

impl ProxyState {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            completion: CompletionClient::new(config.completion),
            speech: SpeechClient::new(config.speech),
        }
    }
}

/// Build the axum router with shared [`ProxyState`].
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/api/tts", post(tts))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn ask(State(state): State<ProxyState>, body: Bytes) -> Response {
    let req: AskRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            error!("unreadable /ask body: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, ASK_FAILED).into_response();
        }
    };

    match state.completion.complete(&req.prompt).await {
        Ok(reply) => Json(AskResponse { reply }).into_response(),
        Err(e) => {
            error!("error getting response from model: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, ASK_FAILED).into_response()
        }
    }
}

async fn tts(State(state): State<ProxyState>, body: Bytes) -> Response {
    let req: SynthesisRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            error!("unreadable /api/tts body: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, TTS_FAILED).into_response();
        }
    };

    let resp = match state.speech.start(&req.text, req.voice()).await {
        Ok(resp) => resp,
        Err(e) => {
            error!("speech synthesis failed: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, TTS_FAILED).into_response();
        }
    };

    debug!("tts: streaming audio for {} chars", req.text.len());
    let stream = resp
        .bytes_stream()
        .inspect_err(|e| error!("speech stream interrupted: {e}"));

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "audio/mpeg")],
        Body::from_stream(stream),
    )
        .into_response()
}
