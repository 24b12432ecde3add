//! Synthesis proxy binary.
//!
//! Serves the same-origin `/tts` endpoint plus the model/voice catalog.
//! Configuration comes from `purr.toml` in the working directory when
//! present; the `BACKEND_URL` environment variable overrides the backend
//! base URL either way.

use purr::config::FrontendConfig;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = Path::new("purr.toml");
    let config = if config_path.exists() {
        FrontendConfig::from_file(config_path)
            .map_err(|e| anyhow::anyhow!("cannot load {}: {e}", config_path.display()))?
    } else {
        FrontendConfig::default()
    };

    tracing::info!("purr-proxy starting");

    purr::proxy::run_proxy(&config.proxy).await.map_err(|e| {
        tracing::error!(error = %e, "purr-proxy exited with error");
        anyhow::anyhow!("purr-proxy failed: {e}")
    })?;

    Ok(())
}
