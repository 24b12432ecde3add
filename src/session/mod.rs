//! Client-side playback session: artifact ownership, player bindings,
//! and the generate/play/pause/download state machine.

pub mod artifact;
pub mod controller;
pub mod player;

pub use artifact::{AudioArtifact, LiveGauge, OUTPUT_FILENAME};
pub use controller::{Phase, PlaybackSession, RequestToken};
pub use player::{ArtifactPlayer, CpalBackend, CpalPlayer, PlayerBackend};
