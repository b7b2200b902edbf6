//! Third-party event submission.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use auditrelay_types::AuditEvent;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiResult;
use crate::handlers::enqueue_background;
use crate::state::AppState;

/// Query parameters of a generic submission.
#[derive(Debug, Deserialize)]
pub(crate) struct GenericQuery {
    /// Name of the submitting system, used to prefix the event name.
    #[serde(default)]
    resource: String,
}

/// Receive a canonical audit event from an arbitrary third party.
pub async fn submit_generic(
    State(state): State<AppState>,
    Query(query): Query<GenericQuery>,
    payload: Result<Json<AuditEvent>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(mut event) = payload?;
    info!(resource = %query.resource, "received audit event");

    event.event_name = format!("[{}] {}", query.resource, event.event_name);
    enqueue_background(&state, event);
    Ok(StatusCode::OK)
}
