//! Health and delivery-status surface.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use auditrelay_pipeline::ComponentSet;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Liveness probe.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Report whether delivery to the sink is currently enabled.
pub async fn delivery_enabled(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "enabled": state.gate.is_enabled() }))
}

/// Accept a component-set snapshot and forward it to the gate watcher.
///
/// Stand-in boundary for the cluster-resource watch: whatever observes the
/// platform configuration pushes the full snapshot here.
pub async fn push_components(
    State(state): State<AppState>,
    payload: Result<Json<ComponentSet>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(snapshot) = payload?;
    state
        .components
        .send(snapshot)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("gate watcher unavailable: {e}")))?;
    Ok(StatusCode::OK)
}
