//! Purr: text-to-speech front-end.
//!
//! A browser UI collects text, a voice, and a model; this crate supplies
//! the two pieces behind it:
//!
//! - **Synthesis proxy**: a same-origin `GET /tts` endpoint that forwards
//!   requests to the external TTS backend under a hard deadline and
//!   normalizes every outcome (audio bytes, backend error, timeout,
//!   unreachable) into a structured HTTP response.
//! - **Playback session**: a client-side state machine owning at most one
//!   generated audio artifact — generation, play/pause/resume, download,
//!   replacement, and synchronous resource cleanup.
//!
//! # Architecture
//!
//! UI action → [`session::PlaybackSession`] → [`backend::BackendClient`]
//! → proxy (`/tts`) → synthesis backend → bytes/error flow back up →
//! the session materializes a playable [`session::AudioArtifact`].

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod proxy;
pub mod session;

pub use backend::{BackendClient, SynthesisOutcome, SynthesisRequest};
pub use config::FrontendConfig;
pub use error::{Result, TtsError};
pub use session::{Phase, PlaybackSession};
