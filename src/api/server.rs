//! Admin API server using Axum
//!
//! Exposes pool management, per-proxy health inspection, cooldown
//! controls, and aggregate statistics over REST.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::{ApiServerConfig, Config};
use crate::engine::SelectionEngine;
use crate::error::{Result, StratumError};

use super::middleware::cors_layer;
use super::routes;

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SelectionEngine>,
    pub config: Config,
    pub started_at: Instant,
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: Config, engine: Arc<SelectionEngine>) -> Self {
        let state = AppState {
            engine,
            config: config.clone(),
            started_at: Instant::now(),
        };

        Self {
            config: config.api,
            state,
        }
    }

    /// Build the router
    fn build_router(&self) -> Router {
        let cors = cors_layer(&self.config.cors_origins);

        routes::create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                StratumError::InvalidConfig(format!(
                    "invalid API server address {}:{}",
                    self.config.host, self.config.port
                ))
            })?;

        let router = self.build_router();

        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await
            .map_err(|e| StratumError::Internal(e.to_string()))?;

        info!("API server shut down");
        Ok(())
    }
}
