//! coastal-risk service entry point
//!
//! Loads configuration, opens the observation database and serves the
//! HTTP API until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use coastal_common::config::{database_path, default_config_path, RootFolderResolver, TomlConfig};
use coastal_risk::db::ObservationStore;
use coastal_risk::services::conditions_source;
use coastal_risk::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};

/// Command-line arguments for coastal-risk
#[derive(Parser, Debug)]
#[command(name = "coastal-risk")]
#[command(about = "Coastal flood risk fusion and community observation service")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "COASTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the observation database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level when RUST_LOG is unset (overrides config)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    // Parse before tracing starts so the configured level applies; report afterwards
    let loaded = TomlConfig::load_or_default(&config_path);

    let level = args
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .init();

    info!(
        "Starting coastal-risk v{} (config {})",
        env!("CARGO_PKG_VERSION"),
        config_path.display()
    );

    let config = loaded.with_context(|| {
        format!("Failed to load configuration from {}", config_path.display())
    })?;
    if !config_path.exists() {
        warn!(
            "Config file {} not found, using built-in defaults",
            config_path.display()
        );
    }

    let root_folder = RootFolderResolver::new(args.root_folder, config.root_folder.clone()).resolve();
    let db_path = database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let store = ObservationStore::open(&db_path)
        .await
        .context("Failed to open observation database")?;
    info!("✓ Observation database ready");

    let conditions = conditions_source(&config.conditions);

    let state = AppState::new(store, config.region, config.risk_thresholds, conditions);
    let app = build_router(state);

    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", config.host, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("coastal-risk listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
