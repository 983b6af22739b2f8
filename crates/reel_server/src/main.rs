//! reelforge - turns a topic into a narrated stock-footage video.

mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use reel_core::assets::{GoogleTts, PexelsClient};
use reel_core::config::{ConfigManager, Credentials, Settings};
use reel_core::logging::{init_tracing, LogLevel};
use reel_core::media::FfmpegCompositor;
use reel_core::orchestrator::{Providers, SessionOrchestrator, SessionQueue};
use reel_core::publish::GofileClient;
use reel_core::script::GeminiClient;
use tokio::net::TcpListener;

use routes::AppState;

#[derive(Debug, Parser)]
#[command(name = "reelforge", version, about)]
struct Args {
    /// Settings file, created with defaults when missing.
    #[arg(long, env = "REELFORGE_CONFIG", default_value = "reelforge.toml")]
    config: PathBuf,
    /// Listen address, overriding `server.listen`.
    #[arg(long)]
    listen: Option<SocketAddr>,
    /// Log level, overriding `logging.level` (RUST_LOG wins over both).
    #[arg(long)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before argument parsing so `.env` can also set REELFORGE_CONFIG and RUST_LOG.
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = ConfigManager::new(&args.config);
    config
        .load_or_create()
        .with_context(|| format!("loading settings from {}", args.config.display()))?;
    config
        .ensure_dirs_exist()
        .context("creating temp and log directories")?;
    let mut settings = config.into_settings();
    if let Some(listen) = args.listen {
        settings.server.listen = listen.to_string();
    }

    init_tracing(args.log_level.unwrap_or(settings.logging.level));
    tracing::info!("reelforge {} using {}", reel_core::version(), args.config.display());

    match dotenv {
        Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }
    let credentials = Credentials::from_env();
    for var in credentials.missing() {
        tracing::warn!("{} is not set; sessions will fail at the stage that needs it", var);
    }

    let providers = build_providers(&settings, &credentials)?;
    let orchestrator = Arc::new(SessionOrchestrator::new(&settings, providers));
    let queue = Arc::new(SessionQueue::start(
        orchestrator,
        settings.server.max_concurrent_sessions,
        settings.server.queue_capacity,
    ));

    let app = routes::router(AppState {
        queue: Arc::clone(&queue),
    });

    let listener = TcpListener::bind(&settings.server.listen)
        .await
        .with_context(|| format!("binding {}", settings.server.listen))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated with error")?;

    tracing::info!("Waiting for queued and running sessions to finish");
    queue.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_providers(settings: &Settings, credentials: &Credentials) -> anyhow::Result<Providers> {
    let text = GeminiClient::new(&settings.script, credentials.gemini_api_key.clone())
        .context("building text model client")?;
    let footage = PexelsClient::new(&settings.footage, credentials.pexels_api_key.clone())
        .context("building footage client")?;
    let speech = GoogleTts::new(&settings.speech).context("building speech client")?;
    let publisher = GofileClient::new(&settings.publish).context("building upload client")?;

    Ok(Providers {
        text: Arc::new(text),
        footage: Arc::new(footage),
        speech: Arc::new(speech),
        compositor: Arc::new(FfmpegCompositor::new(&settings.media)),
        publisher: Arc::new(publisher),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cli_overrides() {
        let args = Args::try_parse_from([
            "reelforge",
            "--config",
            "custom.toml",
            "--listen",
            "127.0.0.1:8080",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("custom.toml"));
        assert_eq!(args.listen, Some("127.0.0.1:8080".parse().unwrap()));
        assert_eq!(args.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn providers_build_without_keys() {
        let providers = build_providers(&Settings::default(), &Credentials::default());
        assert!(providers.is_ok());
    }
}
