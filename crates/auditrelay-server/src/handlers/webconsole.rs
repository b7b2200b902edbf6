//! Web terminal session submission.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use auditrelay_types::{AuditEvent, ResourceReport};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiResult;
use crate::handlers::enqueue_background;
use crate::state::AppState;

/// One session message from the web terminal.
#[derive(Debug, Deserialize)]
pub(crate) struct WebconsoleAuditMsg {
    #[serde(default)]
    session_id: String,
    create_time: DateTime<Utc>,
    #[serde(default)]
    pod_name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    cluster_name: String,
    #[serde(default)]
    data: String,
    /// "stdin" or "stdout".
    #[serde(default)]
    data_type: String,
    #[serde(default)]
    remote_ip: String,
    #[serde(default)]
    user_agent: String,
    #[serde(default)]
    container_user: String,
    #[serde(default)]
    web_user: String,
    #[serde(default)]
    platform: String,
}

/// Receive a session message from the web terminal.
pub async fn submit_webconsole(
    State(state): State<AppState>,
    payload: Result<Json<WebconsoleAuditMsg>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(msg) = payload?;
    info!("received webconsole audit event");

    enqueue_background(&state, build_event(&msg));
    Ok(StatusCode::OK)
}

fn build_event(msg: &WebconsoleAuditMsg) -> AuditEvent {
    AuditEvent::builder()
        .event_time(msg.create_time.timestamp())
        .event_name(format!("[Webconsole] {}", msg.data))
        .description(format!(
            "ClusterName: {}, Namespace: {}, ContainerUser: {}, Platform: {}",
            msg.cluster_name, msg.namespace, msg.container_user, msg.platform
        ))
        .source_ip_address(msg.remote_ip.clone())
        .user_agent(msg.user_agent.clone())
        .request_id(msg.session_id.clone())
        .request_parameters(msg.data.clone())
        .event_type(msg.data_type.clone())
        .resource_report(ResourceReport {
            resource_type: "Pod".to_string(),
            resource_id: String::new(),
            resource_name: msg.pod_name.clone(),
        })
        .user_identity(msg.web_user.clone())
        .build()
}
