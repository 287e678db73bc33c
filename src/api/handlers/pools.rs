//! Pool management handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api::server::AppState;
use crate::error::StratumError;
use crate::models::{ProxyEndpoint, ProxyPoolConfig, ProxyTier, RotationStrategy};

/// Request body for registering a pool. IDs are optional and generated
/// when omitted.
#[derive(Debug, Deserialize)]
pub struct CreatePoolRequest {
    pub id: Option<String>,
    pub tier: ProxyTier,
    pub name: String,
    pub endpoints: Vec<CreateEndpointRequest>,
    #[serde(default)]
    pub rotation_strategy: RotationStrategy,
}

#[derive(Debug, Deserialize)]
pub struct CreateEndpointRequest {
    pub id: Option<String>,
    pub url: String,
    pub country: Option<String>,
    #[serde(default)]
    pub is_residential: bool,
}

/// List all pools
pub async fn list_pools(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.pools())
}

/// Get a single pool
pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StratumError> {
    match state.engine.pool(&id) {
        Some(pool) => Ok(Json(pool)),
        None => Err(StratumError::PoolNotFound { id }),
    }
}

/// Register a new pool
pub async fn create_pool(
    State(state): State<AppState>,
    Json(req): Json<CreatePoolRequest>,
) -> Result<impl IntoResponse, StratumError> {
    if req.name.is_empty() {
        return Err(StratumError::InvalidRequest("name is required".to_string()));
    }
    if req.endpoints.is_empty() {
        return Err(StratumError::InvalidRequest(
            "at least one endpoint is required".to_string(),
        ));
    }

    let pool = ProxyPoolConfig {
        id: req.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        tier: req.tier,
        name: req.name,
        endpoints: req
            .endpoints
            .into_iter()
            .map(|e| ProxyEndpoint {
                id: e.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                url: e.url,
                country: e.country,
                is_residential: e.is_residential,
            })
            .collect(),
        rotation_strategy: req.rotation_strategy,
    };

    state.engine.add_pool(pool.clone())?;

    info!(pool_id = %pool.id, tier = %pool.tier, "Created pool");

    Ok((StatusCode::CREATED, Json(pool)))
}

/// Remove a pool
pub async fn delete_pool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StratumError> {
    state.engine.remove_pool(&id)?;
    info!(pool_id = %id, "Deleted pool");
    Ok(StatusCode::NO_CONTENT)
}
