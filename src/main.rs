//! Stratum - Entry Point
//!
//! Starts the selection engine and the admin API server with graceful
//! shutdown support.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod engine;
mod error;
mod models;

use api::ApiServer;
use config::{Config, LogConfig};
use engine::{SelectionEngine, StaticRiskClassifier, TierPolicy};
use error::StratumError;
use models::ProxyPoolConfig;

#[tokio::main]
async fn main() -> error::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log);

    info!("Starting Stratum");

    let engine = Arc::new(SelectionEngine::new(
        config.engine.tracker_config(),
        TierPolicy::default(),
        Arc::new(StaticRiskClassifier::default()),
    ));

    if let Some(path) = &config.engine.pools_file {
        seed_pools(&engine, path)?;
    }

    let (shutdown_tx, _) = watch::channel(false);

    let api_server = ApiServer::new(config.clone(), engine.clone());
    let api_shutdown = shutdown_tx.subscribe();
    let api_task = tokio::spawn(async move {
        if let Err(e) = api_server.run(api_shutdown).await {
            error!("API server error: {}", e);
        }
    });

    info!("API server started on {}", config.api_addr());

    shutdown_signal().await;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    let _ = api_task.await;

    info!("Stratum stopped");
    Ok(())
}

/// Initialize tracing with the configured level and output format
fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("stratum={},tower_http=debug", log.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if log.format == "pretty" {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    }
}

/// Register the pools listed in a JSON seed file
fn seed_pools(engine: &SelectionEngine, path: &str) -> error::Result<()> {
    let raw = std::fs::read_to_string(path)?;
    let pools: Vec<ProxyPoolConfig> = serde_json::from_str(&raw).map_err(|e| {
        StratumError::InvalidConfig(format!("failed to parse pools file {}: {}", path, e))
    })?;

    let count = pools.len();
    for pool in pools {
        engine.add_pool(pool)?;
    }
    info!(pools = count, "Seeded pools from {}", path);
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
