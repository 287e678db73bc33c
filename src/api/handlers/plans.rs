//! Plan entitlement handlers

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::server::AppState;
use crate::error::StratumError;
use crate::models::TenantPlan;

/// Ordered tiers a plan may use, cheapest first
pub async fn plan_tiers(
    State(state): State<AppState>,
    Path(plan): Path<String>,
) -> Result<impl IntoResponse, StratumError> {
    let plan = TenantPlan::from_str(&plan)
        .ok_or_else(|| StratumError::InvalidRequest(format!("unknown plan: {}", plan)))?;

    Ok(Json(json!({
        "plan": plan,
        "tiers": state.engine.available_tiers(plan),
    })))
}
