//! Configuration types for the TTS front-end.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the front-end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Proxy endpoint settings.
    pub proxy: ProxyConfig,
    /// Audio playback settings.
    pub playback: PlaybackConfig,
}

/// Proxy endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Address the proxy listens on.
    pub host: String,
    /// Port the proxy listens on.
    pub port: u16,
    /// Base URL of the synthesis backend.
    ///
    /// Overridden by the `BACKEND_URL` environment variable when set.
    pub backend_url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 5072,
            backend_url: "http://localhost:5073".to_owned(),
        }
    }
}

impl ProxyConfig {
    /// Backend base URL with the `BACKEND_URL` environment override applied.
    pub fn resolve_backend_url(&self) -> String {
        match std::env::var("BACKEND_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => self.backend_url.clone(),
        }
    }
}

/// Audio playback configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Output device name (None = system default).
    pub output_device: Option<String>,
}

impl FrontendConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::TtsError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::TtsError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
