//! Proxy API integration tests against a fake upstream.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use parley_lib::config::ProxyConfig;
use parley_lib::server::{router, ProxyState, ASK_FAILED, TTS_FAILED};

mod common;
use common::{failing_upstream, healthy_upstream, proxy_config, spawn, Recorded, FAKE_MP3};

async fn proxy_for(upstream: Router) -> Router {
    let base = spawn(upstream).await;
    router(ProxyState::new(proxy_config(&base)))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// POST with no content type at all.
fn post_raw(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

// ─── /ask ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ask_returns_reply() {
    let recorded = Recorded::default();
    let app = proxy_for(healthy_upstream(recorded.clone())).await;

    let response = app
        .oneshot(post_json("/ask", serde_json::json!({ "prompt": "hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["reply"], "echo: hello");
    assert_eq!(*recorded.api_versions.lock().unwrap(), vec!["2024-10-21"]);
}

#[tokio::test]
async fn test_ask_empty_choice_is_no_response() {
    let app = proxy_for(healthy_upstream(Recorded::default())).await;

    // The fake model answers this prompt with empty content, which is still
    // a reply; only a missing choice becomes "No response".
    let response = app
        .oneshot(post_json(
            "/ask",
            serde_json::json!({ "prompt": common::SILENT_PROMPT }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["reply"], "");
}

#[tokio::test]
async fn test_ask_upstream_error_is_generic_500() {
    let app = proxy_for(failing_upstream()).await;

    let response = app
        .oneshot(post_json("/ask", serde_json::json!({ "prompt": "hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, ASK_FAILED.as_bytes());
}

#[tokio::test]
async fn test_ask_unreachable_upstream_is_generic_500() {
    // Port 9 (discard) has nothing listening.
    let app = router(ProxyState::new(proxy_config("http://127.0.0.1:9")));

    let response = app
        .oneshot(post_json("/ask", serde_json::json!({ "prompt": "hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, ASK_FAILED.as_bytes());
}

#[tokio::test]
async fn test_ask_unconfigured_is_generic_500() {
    let app = router(ProxyState::new(ProxyConfig::default()));

    let response = app
        .oneshot(post_json("/ask", serde_json::json!({ "prompt": "hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_ask_missing_prompt_is_forwarded_empty() {
    let app = proxy_for(healthy_upstream(Recorded::default())).await;

    let response = app
        .oneshot(post_json("/ask", serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["reply"], "echo: ");
}

#[tokio::test]
async fn test_ask_without_content_type_is_accepted() {
    let app = proxy_for(healthy_upstream(Recorded::default())).await;

    let response = app
        .oneshot(post_raw("/ask", r#"{"prompt":"hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["reply"], "echo: hello");
}

#[tokio::test]
async fn test_ask_bad_bodies_are_generic_500() {
    for request in [
        post_raw("/ask", "not json"),
        post_raw("/ask", ""),
        post_json("/ask", serde_json::json!({})),
    ] {
        let app = router(ProxyState::new(ProxyConfig::default()));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_bytes(response).await, ASK_FAILED.as_bytes());
    }
}

// ─── /api/tts ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_tts_streams_audio() {
    let recorded = Recorded::default();
    let app = proxy_for(healthy_upstream(recorded.clone())).await;

    let response = app
        .oneshot(post_json("/api/tts", serde_json::json!({ "text": "Hello there." })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(body_bytes(response).await, FAKE_MP3);

    let ssml = recorded.ssml.lock().unwrap();
    assert_eq!(ssml.len(), 1);
    assert!(ssml[0].contains("name='en-US-JennyNeural'>Hello there.</voice>"));
}

#[tokio::test]
async fn test_tts_honors_voice_name() {
    let recorded = Recorded::default();
    let app = proxy_for(healthy_upstream(recorded.clone())).await;

    let response = app
        .oneshot(post_json(
            "/api/tts",
            serde_json::json!({ "text": "Hi", "voiceName": "en-GB-RyanNeural" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(recorded.ssml.lock().unwrap()[0].contains("name='en-GB-RyanNeural'"));
}

#[tokio::test]
async fn test_tts_escapes_markup() {
    let recorded = Recorded::default();
    let app = proxy_for(healthy_upstream(recorded.clone())).await;

    let response = app
        .oneshot(post_json(
            "/api/tts",
            serde_json::json!({ "text": "a < b & </voice><break time='5s'/>" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let ssml = recorded.ssml.lock().unwrap();
    assert!(!ssml[0].contains("<break"));
    assert!(ssml[0].contains("a &lt; b &amp; &lt;/voice&gt;"));
}

#[tokio::test]
async fn test_tts_upstream_error_is_generic_500() {
    let app = proxy_for(failing_upstream()).await;

    let response = app
        .oneshot(post_json("/api/tts", serde_json::json!({ "text": "Hi" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, TTS_FAILED.as_bytes());
}

#[tokio::test]
async fn test_tts_unconfigured_is_generic_500() {
    let app = router(ProxyState::new(ProxyConfig::default()));

    let response = app
        .oneshot(post_json("/api/tts", serde_json::json!({ "text": "Hi" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, TTS_FAILED.as_bytes());
}

#[tokio::test]
async fn test_tts_missing_text_and_content_type() {
    let recorded = Recorded::default();
    let app = proxy_for(healthy_upstream(recorded.clone())).await;

    let response = app
        .clone()
        .oneshot(post_json("/api/tts", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, FAKE_MP3);

    let response = app
        .oneshot(post_raw("/api/tts", r#"{"text":"Hi"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let ssml = recorded.ssml.lock().unwrap();
    assert!(ssml[0].contains("name='en-US-JennyNeural'></voice>"));
    assert!(ssml[1].contains(">Hi</voice>"));
}

#[tokio::test]
async fn test_tts_bad_bodies_are_generic_500() {
    for request in [
        post_raw("/api/tts", "<speak/>"),
        post_json("/api/tts", serde_json::json!({})),
    ] {
        let app = router(ProxyState::new(ProxyConfig::default()));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_bytes(response).await, TTS_FAILED.as_bytes());
    }
}

#[tokio::test]
async fn test_cors_is_permissive() {
    let app = router(ProxyState::new(ProxyConfig::default()));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/ask")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
