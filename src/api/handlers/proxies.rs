//! Per-proxy health and cooldown handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::api::server::AppState;
use crate::error::StratumError;
use crate::models::FailureReason;

/// Request body for forcing a cooldown
#[derive(Debug, Deserialize)]
pub struct ForceCooldownRequest {
    pub reason: Option<FailureReason>,
    /// Overrides the configured cooldown duration when set
    pub duration_minutes: Option<i64>,
}

/// Get the full health record of one proxy
pub async fn get_health(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StratumError> {
    let health = state.engine.proxy_health(&id)?;
    Ok(Json(health))
}

/// Force a proxy into cooldown
pub async fn force_cooldown(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ForceCooldownRequest>,
) -> Result<impl IntoResponse, StratumError> {
    let reason = req.reason.unwrap_or(FailureReason::Other);
    state
        .engine
        .force_cooldown(&id, reason, req.duration_minutes)?;

    info!(proxy_id = %id, reason = %reason, "Cooldown forced via API");

    Ok(Json(json!({
        "proxy_id": id,
        "status": "cooldown",
    })))
}

/// Clear an active cooldown
pub async fn clear_cooldown(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StratumError> {
    state.engine.clear_cooldown(&id)?;
    info!(proxy_id = %id, "Cooldown cleared via API");
    Ok(StatusCode::NO_CONTENT)
}

/// Clear a domain's block marks across all proxies
pub async fn clear_domain_blocks(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> impl IntoResponse {
    let cleared = state.engine.clear_domain_blocks(&domain);
    info!(domain = %domain, cleared, "Domain blocks cleared via API");
    Json(json!({
        "domain": domain,
        "cleared": cleared,
    }))
}
