//! Same-origin proxy in front of the synthesis backend.
//!
//! Exposes `GET /tts` and normalizes every backend outcome into a
//! structured HTTP response: success relays the audio bytes unchanged
//! with an attachment filename; validation failures, backend errors,
//! timeouts, and unreachable backends each map to a distinct status and
//! `{"detail": ...}` body. Nothing escapes the handler as a panic.
//!
//! Also serves the fixed model/voice catalog (`/models`, `/voices`) and
//! a `/health` probe.

use crate::backend::{BackendClient, SynthesisOutcome, SynthesisRequest};
use crate::catalog;
use crate::config::ProxyConfig;
use crate::session::artifact::OUTPUT_FILENAME;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

/// Shared state for the proxy routes.
#[derive(Clone)]
pub struct ProxyState {
    client: Arc<BackendClient>,
}

impl ProxyState {
    /// Create proxy state around a backend client.
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[derive(serde::Deserialize)]
struct TtsQuery {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

/// Build the proxy router.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/tts", get(tts_handler))
        .route("/models", get(list_models))
        .route("/voices", get(list_voices))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind and serve the proxy until the task is cancelled.
pub async fn run_proxy(config: &ProxyConfig) -> anyhow::Result<()> {
    let backend_url = config.resolve_backend_url();
    let client = Arc::new(BackendClient::new(backend_url));
    let state = ProxyState::new(client);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!("synthesis proxy listening on http://{local_addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn tts_handler(State(state): State<ProxyState>, Query(query): Query<TtsQuery>) -> Response {
    // Local zero-cost check: empty input never reaches the backend.
    let text = query.text.unwrap_or_default();
    if text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"detail": "Missing 'text' parameter"})),
        )
            .into_response();
    }

    let mut request = SynthesisRequest::new(text);
    if let Some(voice) = query.voice {
        request = request.with_voice(voice);
    }
    if let Some(model) = query.model {
        request = request.with_model(model);
    }

    let outcome = state.client.synthesize(&request).await;
    tracing::debug!(outcome = %outcome, "synthesis outcome");
    outcome_response(outcome)
}

/// Translate a synthesis outcome into the proxy's HTTP response.
fn outcome_response(outcome: SynthesisOutcome) -> Response {
    match outcome {
        SynthesisOutcome::Audio {
            bytes,
            content_type,
        } => (
            [
                (header::CONTENT_TYPE, content_type),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{OUTPUT_FILENAME}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        SynthesisOutcome::BackendError {
            status_code,
            detail,
        } => (
            // Invalid codes from a misbehaving backend degrade to 502.
            StatusCode::from_u16(status_code).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(serde_json::json!({"detail": detail})),
        )
            .into_response(),
        SynthesisOutcome::Timeout => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(serde_json::json!({"detail": crate::backend::TIMEOUT_DETAIL})),
        )
            .into_response(),
        SynthesisOutcome::Unreachable => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"detail": crate::backend::UNREACHABLE_DETAIL})),
        )
            .into_response(),
    }
}

async fn list_models() -> impl IntoResponse {
    let ids: Vec<&str> = catalog::MODELS.iter().map(|m| m.id).collect();
    Json(serde_json::json!({ "models": ids }))
}

async fn list_voices() -> impl IntoResponse {
    Json(serde_json::json!({ "voices": catalog::VOICES }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}
