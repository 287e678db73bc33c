//! Statistics handlers

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::api::server::AppState;

/// Aggregate statistics across all tracked proxies
pub async fn aggregate_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.aggregate_stats())
}

/// Per-pool statistics
pub async fn pool_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.pool_stats())
}
