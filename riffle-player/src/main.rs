//! Riffle Player (riffle-player) - Main entry point
//!
//! Runs the playback engine behind an HTTP control surface with an SSE event
//! stream for presentation clients.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use riffle_common::config::{resolve_config_path, CONFIG_ENV_VAR};
use riffle_player::api::{self, AppContext};
use riffle_player::audio::ClockOutput;
use riffle_player::config::TomlConfig;
use riffle_player::gateway::{CatalogGateway, DataGateway, HttpGateway};
use riffle_player::{PlaybackEngine, SharedState};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for riffle-player
#[derive(Parser, Debug)]
#[command(name = "riffle-player")]
#[command(about = "Playback engine service for the riffle streaming client")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "RIFFLE_PORT")]
    port: Option<u16>,

    /// Offline TOML catalog to serve tracks and playlists from
    #[arg(long, env = "RIFFLE_CATALOG")]
    catalog: Option<PathBuf>,

    /// Base URL of the record store HTTP API
    #[arg(long, env = "RIFFLE_GATEWAY_URL")]
    gateway_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let config = TomlConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing (RUST_LOG wins over the configured level)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = args.port.unwrap_or(config.port);
    info!("Starting Riffle Player v{} on port {}", env!("CARGO_PKG_VERSION"), port);
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("Config file: none (built-in defaults)"),
    }

    let gateway = build_gateway(&args, &config)?;

    // One audio output for the whole process
    let (output_tx, output_rx) = mpsc::unbounded_channel();
    let output = ClockOutput::new(
        output_tx,
        config.engine.position_interval(),
        config.engine.manifest_timeout(),
    )?;

    let state = Arc::new(SharedState::new());
    let engine = Arc::new(PlaybackEngine::new(
        gateway,
        Box::new(output),
        output_rx,
        Arc::clone(&state),
        config.engine,
    ));
    engine
        .start()
        .await
        .context("Failed to start playback engine")?;
    info!("Playback engine initialized");

    let ctx = AppContext { state, engine };
    api::run(port, ctx, shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Pick the data gateway: an offline catalog wins over a remote record store
fn build_gateway(args: &Args, config: &TomlConfig) -> Result<Arc<dyn DataGateway>> {
    let catalog = args
        .catalog
        .clone()
        .or_else(|| config.gateway.catalog_path.clone());
    if let Some(path) = catalog {
        let gateway = CatalogGateway::load(&path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?;
        info!(
            "Serving {} tracks from catalog {}",
            gateway.track_count(),
            path.display()
        );
        return Ok(Arc::new(gateway));
    }

    let base_url = args
        .gateway_url
        .clone()
        .or_else(|| config.gateway.base_url.clone());
    if let Some(base_url) = base_url {
        let gateway = HttpGateway::new(base_url, config.gateway.timeout())
            .context("Failed to create HTTP gateway")?;
        info!("Using record store at {}", gateway.base_url());
        return Ok(Arc::new(gateway));
    }

    bail!("No data gateway configured: set gateway.catalog_path or gateway.base_url")
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
