//! Proxy contract tests.
//!
//! Run the real router against a wiremock backend and verify the
//! outcome translation: byte-exact audio relay, error passthrough,
//! timeout vs unreachable classification, and the local empty-text
//! rejection that never touches the backend.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use purr::backend::{
    BackendClient, GENERIC_BACKEND_DETAIL, TIMEOUT_DETAIL, UNREACHABLE_DETAIL,
};
use purr::proxy::{ProxyState, router};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serve the proxy router on an ephemeral port, returning its base URL.
async fn spawn_proxy(client: BackendClient) -> String {
    let app = router(ProxyState::new(Arc::new(client)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn missing_text_is_rejected_without_backend_call() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tts"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let proxy = spawn_proxy(BackendClient::new(backend.uri())).await;

    let resp = reqwest::get(format!("{proxy}/tts")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Missing 'text' parameter");

    // Whitespace-only text is empty after trimming.
    let resp = reqwest::get(format!("{proxy}/tts?text=%20%20"))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn success_relays_backend_bytes_exactly() {
    let audio: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfmt \xff\xfe\x01\x02";

    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tts"))
        .and(query_param("text", "Hello world"))
        .and(query_param("voice", "Luna"))
        .and(query_param("model", "m1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(audio))
        .expect(1)
        .mount(&backend)
        .await;

    let proxy = spawn_proxy(BackendClient::new(backend.uri())).await;

    let resp = reqwest::get(format!(
        "{proxy}/tts?text=Hello%20world&voice=Luna&model=m1"
    ))
    .await
    .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "audio/wav"
    );
    assert_eq!(
        resp.headers()["content-disposition"].to_str().unwrap(),
        "attachment; filename=\"output.wav\""
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), audio);
}

#[tokio::test]
async fn absent_voice_and_model_are_not_forwarded() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tts"))
        .and(query_param("text", "hi"))
        .and(query_param_is_missing("voice"))
        .and(query_param_is_missing("model"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF".as_slice()))
        .expect(1)
        .mount(&backend)
        .await;

    let proxy = spawn_proxy(BackendClient::new(backend.uri())).await;

    let resp = reqwest::get(format!("{proxy}/tts?text=hi")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn backend_content_type_is_echoed() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"ID3".as_slice())
                .insert_header("content-type", "audio/mpeg"),
        )
        .mount(&backend)
        .await;

    let proxy = spawn_proxy(BackendClient::new(backend.uri())).await;

    let resp = reqwest::get(format!("{proxy}/tts?text=hi")).await.unwrap();
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "audio/mpeg"
    );
}

#[tokio::test]
async fn backend_error_status_and_detail_pass_through() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tts"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"detail": "OOM"})),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let proxy = spawn_proxy(BackendClient::new(backend.uri())).await;

    let resp = reqwest::get(format!("{proxy}/tts?text=hi")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "OOM");
}

#[tokio::test]
async fn malformed_error_body_gets_generic_detail() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tts"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>oops</html>"))
        .mount(&backend)
        .await;

    let proxy = spawn_proxy(BackendClient::new(backend.uri())).await;

    let resp = reqwest::get(format!("{proxy}/tts?text=hi")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 503);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], GENERIC_BACKEND_DETAIL);
}

#[tokio::test]
async fn deadline_expiry_maps_to_504_with_loading_hint() {
    let backend = MockServer::start().await;
    // A single bounded attempt: one call, no retries after the deadline.
    Mock::given(method("GET"))
        .and(path("/tts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"RIFF".as_slice())
                .set_delay(Duration::from_secs(5)),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let client = BackendClient::with_deadline(backend.uri(), Duration::from_millis(200));
    let proxy = spawn_proxy(client).await;

    let resp = reqwest::get(format!("{proxy}/tts?text=hi")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 504);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], TIMEOUT_DETAIL);
}

#[tokio::test]
async fn unreachable_backend_maps_to_502_distinct_from_timeout() {
    // Bind and immediately drop a listener so the port is dead.
    let dead = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = dead.local_addr().unwrap().port();
    drop(dead);

    let proxy = spawn_proxy(BackendClient::new(format!("http://127.0.0.1:{port}"))).await;

    let resp = reqwest::get(format!("{proxy}/tts?text=hi")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], UNREACHABLE_DETAIL);
    assert_ne!(UNREACHABLE_DETAIL, TIMEOUT_DETAIL);
    assert_ne!(body["detail"], GENERIC_BACKEND_DETAIL);
}

#[tokio::test]
async fn catalog_and_health_routes_serve_fixed_data() {
    let proxy = spawn_proxy(BackendClient::new("http://127.0.0.1:1")).await;

    let models: serde_json::Value = reqwest::get(format!("{proxy}/models"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(models["models"].as_array().unwrap().len(), 4);
    assert_eq!(models["models"][0], "KittenML/kitten-tts-mini-0.8");

    let voices: serde_json::Value = reqwest::get(format!("{proxy}/voices"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(voices["voices"].as_array().unwrap().len(), 8);
    assert!(
        voices["voices"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("Jasper"))
    );

    let health: serde_json::Value = reqwest::get(format!("{proxy}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
}
