//! Backend client adapter for the synthesis service.
//!
//! Issues one bounded `GET /tts` per synthesis call and classifies the
//! result into a [`SynthesisOutcome`]:
//!
//! - [`Audio`](SynthesisOutcome::Audio) — success, raw bytes relayed unchanged
//! - [`BackendError`](SynthesisOutcome::BackendError) — backend reachable,
//!   returned a non-success status
//! - [`Timeout`](SynthesisOutcome::Timeout) — no response within the deadline
//! - [`Unreachable`](SynthesisOutcome::Unreachable) — network-level failure
//!   before any response (connection refused, DNS, reset)
//!
//! There are no retries: a single bounded attempt per call. Repeated
//! identical requests may produce acoustically different audio; the adapter
//! makes no stability claim.

use bytes::Bytes;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Hard deadline for one backend call.
///
/// First-time model loads can take minutes on the backend, so the ceiling
/// is generous. When it elapses the in-flight request is cancelled.
pub const REQUEST_DEADLINE: Duration = Duration::from_secs(300);

/// Detail text for the timeout outcome. Distinct from backend-reported
/// errors so the UI can hint that the model may still be loading.
pub const TIMEOUT_DETAIL: &str = "Request timed out. The model may still be loading.";

/// Detail text for the unreachable outcome.
pub const UNREACHABLE_DETAIL: &str = "Cannot reach the TTS backend. Is it running?";

/// Substitute detail when a backend error body cannot be parsed.
pub const GENERIC_BACKEND_DETAIL: &str = "Backend error";

/// One synthesis request: text plus optional voice and model selection.
///
/// Absent voice/model fall back to the backend's defaults — the adapter
/// omits the query parameters entirely rather than sending empty values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Text to synthesize.
    pub text: String,
    /// Voice name (opaque to the proxy).
    pub voice: Option<String>,
    /// Model identifier (opaque to the proxy).
    pub model: Option<String>,
}

impl SynthesisRequest {
    /// Create a request with just the text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            model: None,
        }
    }

    /// Select a voice.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Select a model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Whether the text is non-empty after trimming.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Query parameters for the outbound `/tts` call.
    pub fn query_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![("text", self.text.as_str())];
        if let Some(ref voice) = self.voice {
            params.push(("voice", voice.as_str()));
        }
        if let Some(ref model) = self.model {
            params.push(("model", model.as_str()));
        }
        params
    }
}

/// Result of one synthesis call. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// Backend returned audio. Bytes are the backend's response body,
    /// byte-for-byte.
    Audio {
        /// Raw audio payload.
        bytes: Bytes,
        /// Content type reported by the backend (`audio/wav` when absent).
        content_type: String,
    },
    /// Backend responded with a non-success status.
    BackendError {
        /// HTTP status code reported by the backend.
        status_code: u16,
        /// Parsed `detail` message, or [`GENERIC_BACKEND_DETAIL`].
        detail: String,
    },
    /// The deadline elapsed before the backend responded.
    Timeout,
    /// Network-level failure before any response.
    Unreachable,
}

impl SynthesisOutcome {
    /// User-facing detail text for failure outcomes. `None` for audio.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Audio { .. } => None,
            Self::BackendError { detail, .. } => Some(detail),
            Self::Timeout => Some(TIMEOUT_DETAIL),
            Self::Unreachable => Some(UNREACHABLE_DETAIL),
        }
    }

    /// Returns `true` for the audio variant.
    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio { .. })
    }
}

impl fmt::Display for SynthesisOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio {
                bytes,
                content_type,
            } => write!(f, "audio ({} bytes, {content_type})", bytes.len()),
            Self::BackendError {
                status_code,
                detail,
            } => write!(f, "backend error (HTTP {status_code}): {detail}"),
            Self::Timeout => write!(f, "timeout (no response within deadline)"),
            Self::Unreachable => write!(f, "unreachable (no response)"),
        }
    }
}

/// HTTP client for the synthesis backend.
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a client for the given backend base URL with the standard
    /// [`REQUEST_DEADLINE`].
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_deadline(base_url, REQUEST_DEADLINE)
    }

    /// Create a client with a custom deadline.
    ///
    /// The deadline is fixed in production; this constructor exists so the
    /// timeout path can be exercised without a five-minute wait.
    pub fn with_deadline(base_url: impl Into<String>, deadline: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(deadline)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Backend base URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Synthesize speech for the request.
    ///
    /// Issues exactly one outbound call and never fails past its boundary:
    /// every failure mode is folded into the returned [`SynthesisOutcome`].
    /// Input validation (non-empty text) is the caller's responsibility.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> SynthesisOutcome {
        let url = format!("{}/tts", self.base_url.trim_end_matches('/'));

        let response = match self
            .client
            .get(&url)
            .query(&request.query_params())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                debug!(error = %e, "synthesis transport failure");
                return classify_transport_error(&e);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return SynthesisOutcome::BackendError {
                status_code: status.as_u16(),
                detail: extract_detail(&body),
            };
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/wav")
            .to_owned();

        match response.bytes().await {
            Ok(bytes) => SynthesisOutcome::Audio {
                bytes,
                content_type,
            },
            // The connection dropped mid-body; no complete payload exists.
            Err(e) => {
                debug!(error = %e, "synthesis body read failure");
                classify_transport_error(&e)
            }
        }
    }
}

/// Classify a transport-level failure.
///
/// A deadline expiry becomes [`SynthesisOutcome::Timeout`]; every other
/// network failure (connection refused, DNS, reset) becomes
/// [`SynthesisOutcome::Unreachable`]. The two carry different user-facing
/// detail text.
fn classify_transport_error(err: &reqwest::Error) -> SynthesisOutcome {
    if err.is_timeout() {
        SynthesisOutcome::Timeout
    } else {
        SynthesisOutcome::Unreachable
    }
}

/// Extract the `detail` message from a backend error body.
///
/// Expected format: `{"detail": "..."}`. Anything else yields
/// [`GENERIC_BACKEND_DETAIL`].
fn extract_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or_else(|| GENERIC_BACKEND_DETAIL.to_owned())
}
