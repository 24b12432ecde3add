//! Playback session state machine.
//!
//! One session owns at most one generated artifact and at most one
//! player binding. Transitions:
//!
//! ```text
//!               begin_generate (any state, tears down first)
//!                    │
//!   Idle ──────► Generating ──complete(Audio)──► Ready ──play──► Playing
//!                    │                             ▲               │  ▲
//!              complete(error)          playback_finished        pause play
//!                    │                             │               ▼  │
//!                    ▼                             └───────────── Paused
//!                  Error
//! ```
//!
//! `reset` (an input edit) tears everything down and returns to `Idle`.
//! Downloads are available whenever an artifact exists and change no
//! state.
//!
//! Completions are matched against a monotonically increasing request
//! token: a response is applied only when the session is still waiting
//! on that exact request, so a stale response can never overwrite a
//! newer one.

use crate::backend::{BackendClient, SynthesisOutcome, SynthesisRequest};
use crate::catalog::DEFAULT_TEXT;
use crate::error::Result;
use crate::session::artifact::{AudioArtifact, LiveGauge, OUTPUT_FILENAME};
use crate::session::player::{ArtifactPlayer, PlayerBackend};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sequence token identifying one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Observable session phase, without the owned payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No artifact, nothing in flight.
    Idle,
    /// Waiting on a synthesis response.
    Generating,
    /// Artifact available, no player bound.
    Ready,
    /// Player bound and running.
    Playing,
    /// Player bound, position retained.
    Paused,
    /// Last generation failed.
    Error,
}

enum State<P> {
    Idle,
    Generating {
        token: RequestToken,
    },
    Ready {
        artifact: AudioArtifact,
    },
    Playing {
        artifact: AudioArtifact,
        player: P,
    },
    Paused {
        artifact: AudioArtifact,
        player: P,
    },
    Error {
        message: String,
    },
}

/// Client-side controller for one audio artifact's lifecycle.
pub struct PlaybackSession<B: PlayerBackend> {
    backend: B,
    state: State<B::Player>,
    next_token: u64,
    gauge: LiveGauge,
}

impl<B: PlayerBackend> PlaybackSession<B> {
    /// Create an idle session using the given player backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: State::Idle,
            next_token: 0,
            gauge: LiveGauge::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Generating { .. } => Phase::Generating,
            State::Ready { .. } => Phase::Ready,
            State::Playing { .. } => Phase::Playing,
            State::Paused { .. } => Phase::Paused,
            State::Error { .. } => Phase::Error,
        }
    }

    /// The current artifact, when one exists.
    pub fn artifact(&self) -> Option<&AudioArtifact> {
        match &self.state {
            State::Ready { artifact }
            | State::Playing { artifact, .. }
            | State::Paused { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    /// The failure message, when in the error phase.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            State::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Whether the bound player has consumed all samples.
    ///
    /// UI event loops poll this while playing and deliver
    /// [`playback_finished`](PlaybackSession::playback_finished) when it
    /// turns true. `false` outside the playing phase.
    pub fn playback_done(&self) -> bool {
        match &self.state {
            State::Playing { player, .. } => player.is_finished(),
            _ => false,
        }
    }

    /// Number of live artifact resources owned by this session.
    ///
    /// Always 0 or 1; every replacement releases the prior resource
    /// before the next one is created.
    pub fn live_artifacts(&self) -> usize {
        self.gauge.count()
    }

    /// Start a new generation.
    ///
    /// Any existing player is stopped and any existing artifact released
    /// before the session enters the generating phase. The returned token
    /// must accompany the eventual [`complete_generate`] call.
    ///
    /// [`complete_generate`]: PlaybackSession::complete_generate
    pub fn begin_generate(&mut self) -> RequestToken {
        self.teardown();
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        debug!(token = token.0, "generation started");
        self.state = State::Generating { token };
        token
    }

    /// Deliver the outcome of a generation request.
    ///
    /// Applied only when the session is still waiting on `token`; a
    /// completion for a superseded or abandoned request is discarded.
    pub fn complete_generate(&mut self, token: RequestToken, outcome: SynthesisOutcome) {
        match &self.state {
            State::Generating { token: current } if *current == token => {}
            _ => {
                debug!(token = token.0, "discarding stale synthesis outcome");
                return;
            }
        }

        self.state = match outcome {
            SynthesisOutcome::Audio {
                bytes,
                content_type,
            } => {
                let artifact = AudioArtifact::new(bytes, content_type, &self.gauge);
                debug!(token = token.0, "artifact ready");
                State::Ready { artifact }
            }
            outcome => {
                let message = outcome
                    .detail()
                    .unwrap_or("TTS generation failed")
                    .to_owned();
                debug!(token = token.0, message = %message, "generation failed");
                State::Error { message }
            }
        };
    }

    /// Play or resume the current artifact.
    ///
    /// From the ready phase this binds a new player and starts it; from
    /// the paused phase it resumes the retained binding. Any other phase
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the player backend rejects the artifact or the
    /// stream cannot be started; the session stays in its prior phase.
    pub fn play(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Ready { artifact } => {
                let mut player = match self.backend.bind(&artifact) {
                    Ok(player) => player,
                    Err(e) => {
                        self.state = State::Ready { artifact };
                        return Err(e);
                    }
                };
                if let Err(e) = player.start() {
                    self.state = State::Ready { artifact };
                    return Err(e);
                }
                self.state = State::Playing { artifact, player };
                Ok(())
            }
            State::Paused {
                artifact,
                mut player,
            } => {
                if let Err(e) = player.resume() {
                    self.state = State::Paused { artifact, player };
                    return Err(e);
                }
                self.state = State::Playing { artifact, player };
                Ok(())
            }
            other => {
                self.state = other;
                Ok(())
            }
        }
    }

    /// Pause playback, retaining the position and the player binding.
    ///
    /// No-op outside the playing phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be paused; the session stays
    /// in the playing phase.
    pub fn pause(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Playing {
                artifact,
                mut player,
            } => {
                if let Err(e) = player.pause() {
                    self.state = State::Playing { artifact, player };
                    return Err(e);
                }
                self.state = State::Paused { artifact, player };
                Ok(())
            }
            other => {
                self.state = other;
                Ok(())
            }
        }
    }

    /// Handle natural end-of-audio: release the player, keep the artifact
    /// for replay and download.
    ///
    /// No-op outside the playing phase.
    pub fn playback_finished(&mut self) {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Playing {
                artifact,
                mut player,
            } => {
                player.stop();
                self.state = State::Ready { artifact };
            }
            other => self.state = other,
        }
    }

    /// Tear down any artifact and player and return to idle.
    ///
    /// Input edits invalidate the previous result; the UI calls this on
    /// every text/voice/model change.
    pub fn reset(&mut self) {
        self.teardown();
        debug!("session reset");
    }

    /// Write the current artifact's bytes to `dir/output.wav`.
    ///
    /// Available whenever an artifact exists, independent of playback
    /// status; changes no state. Returns `None` when no artifact exists
    /// (the UI disables the button).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn download(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let Some(artifact) = self.artifact() else {
            return Ok(None);
        };
        let path = dir.join(OUTPUT_FILENAME);
        std::fs::write(&path, artifact.bytes())?;
        Ok(Some(path))
    }

    /// Run one generation to completion against a synthesis client.
    ///
    /// Empty text falls back to the demo sentence, mirroring the UI.
    /// Sequential convenience wrapper over [`begin_generate`] and
    /// [`complete_generate`]; event-driven callers use those directly so
    /// a newer request can supersede the wait.
    ///
    /// [`begin_generate`]: PlaybackSession::begin_generate
    /// [`complete_generate`]: PlaybackSession::complete_generate
    pub async fn run_generate(&mut self, client: &BackendClient, mut request: SynthesisRequest) {
        if !request.has_text() {
            request.text = DEFAULT_TEXT.to_owned();
        }
        let token = self.begin_generate();
        let outcome = client.synthesize(&request).await;
        self.complete_generate(token, outcome);
    }

    /// Stop and drop the player, release the artifact. Synchronous, in
    /// that order, so no two live artifacts ever overlap.
    fn teardown(&mut self) {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Playing {
                mut artifact,
                mut player,
            }
            | State::Paused {
                mut artifact,
                mut player,
            } => {
                player.stop();
                drop(player);
                artifact.release();
            }
            State::Ready { mut artifact } => {
                artifact.release();
            }
            State::Idle | State::Generating { .. } | State::Error { .. } => {}
        }
    }
}
