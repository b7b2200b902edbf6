//! Internal-platform event submission.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use auditrelay_types::AuditEvent;
use tracing::info;

use crate::error::ApiResult;
use crate::handlers::enqueue_background;
use crate::state::AppState;

/// Receive a canonical audit event from the internal platform.
pub async fn submit_platform(
    State(state): State<AppState>,
    payload: Result<Json<AuditEvent>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(event) = payload?;
    info!("received platform audit event");

    enqueue_background(&state, event);
    Ok(StatusCode::OK)
}
