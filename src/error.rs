//! Error types for the purr front-end.

/// Top-level error type for the TTS front-end.
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Audio device or stream error.
    #[error("audio error: {0}")]
    Audio(String),

    /// Playback session error.
    #[error("session error: {0}")]
    Session(String),

    /// Proxy server error.
    #[error("server error: {0}")]
    Server(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TtsError>;
