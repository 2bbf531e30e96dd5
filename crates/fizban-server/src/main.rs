//! Server binary for the Fizban world backend.
//!
//! Wires configuration, logging, persistence, and the HTTP API together
//! and serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `FIZBAN_CONFIG` or `fizban-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the travel graph and the world
//! 4. Restore the snapshot, when persistence is configured
//! 5. Load addons and serve HTTP until `Ctrl-C`
//! 6. Write the snapshot, when persistence is configured

mod error;
mod persistence;

use std::path::PathBuf;
use std::sync::Arc;

use fizban_api::{AddonRegistry, AppState, ServerConfig, start_server, wait_for_shutdown};
use fizban_core::config::LoggingConfig;
use fizban_core::{FizbanConfig, LogFormat, World};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::BackendError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "fizban-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any startup step, the server, or the final
/// snapshot fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_tracing(&config.logging);
    run(config).await?;
    Ok(())
}

async fn run(config: FizbanConfig) -> Result<(), BackendError> {
    info!(
        host = config.server.host,
        port = config.server.port,
        addons = config.addons.enabled,
        snapshot = ?config.persistence.snapshot_path,
        "fizban-server starting"
    );

    let world = Arc::new(config.build_world()?);
    info!(
        locations = world.graph().location_count(),
        lanes = world.graph().lane_count(),
        "Travel graph ready"
    );

    if let Some(path) = &config.persistence.snapshot_path {
        restore_snapshot(&world, path)?;
    }

    let addons = AddonRegistry::from_setting(&config.addons.enabled);
    let state = Arc::new(AppState::new(Arc::clone(&world), addons));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
        }
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    start_server(&server_config, state, wait_for_shutdown(shutdown_rx)).await?;

    if let Some(path) = &config.persistence.snapshot_path {
        let snapshot = world.snapshot()?;
        persistence::save(path, &snapshot)?;
        info!(
            path = %path.display(),
            tick = snapshot.tick,
            actors = snapshot.actor_count(),
            "Snapshot written"
        );
    }

    info!("fizban-server stopped");
    Ok(())
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Load configuration from `FIZBAN_CONFIG` or `fizban-config.yaml`.
///
/// Falls back to defaults (plus environment overrides) when the file does
/// not exist.
fn load_config() -> Result<FizbanConfig, BackendError> {
    let config_path = std::env::var("FIZBAN_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        Ok(FizbanConfig::from_file(&config_path)?)
    } else {
        let mut config = FizbanConfig::default();
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }
}

fn restore_snapshot(world: &World, path: &std::path::Path) -> Result<(), BackendError> {
    match persistence::load(path)? {
        Some(snapshot) => {
            let actors = snapshot.actor_count();
            world.restore(snapshot)?;
            info!(path = %path.display(), actors, "Snapshot restored");
        }
        None => info!(path = %path.display(), "No snapshot found, starting fresh"),
    }
    Ok(())
}
