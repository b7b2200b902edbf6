//! API-server audit log submission.

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

const EVENT_TYPE_USER_WRITE: &str = "userwrite";

/// List of API-server audit events, as POSTed by the audit webhook.
#[derive(Debug, Deserialize)]
pub(crate) struct K8sEventList {
    #[serde(default)]
    items: Vec<K8sAuditEvent>,
}

/// The subset of an API-server audit event this service consumes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct K8sAuditEvent {
    #[serde(rename = "auditID", default)]
    audit_id: String,
    #[serde(default)]
    stage_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    verb: String,
    #[serde(rename = "requestURI", default)]
    request_uri: String,
    #[serde(rename = "sourceIPs", default)]
    source_ips: Vec<String>,
    #[serde(default)]
    user_agent: String,
    #[serde(default)]
    user: Option<K8sUser>,
    #[serde(default)]
    response_status: Option<K8sResponseStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct K8sUser {
    #[serde(default)]
    username: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct K8sResponseStatus {
    #[serde(default)]
    code: i32,
}

/// Receive a batch of API-server audit events; each item is translated to
/// the canonical shape and enqueued individually.
pub async fn submit_k8s(
    State(state): State<AppState>,
    payload: Result<Json<K8sEventList>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(list) = payload?;
    info!(count = list.items.len(), "received k8s audit event list");

    for item in &list.items {
        enqueue_background(&state, build_event(item));
    }
    Ok(StatusCode::OK)
}

fn build_event(raw: &K8sAuditEvent) -> AuditEvent {
    let object = resource_from_uri(&raw.request_uri);
    let status = raw
        .response_status
        .as_ref()
        .map(|s| s.code)
        .unwrap_or_default();
    let event_name = format!("[Kubernetes] {} {}", raw.verb, object);

    let mut builder = AuditEvent::builder()
        .event_time(raw.stage_timestamp.map(|t| t.timestamp()).unwrap_or_default())
        .event_version("V1")
        .event_name(event_name.clone())
        .description(event_name)
        .source_ip_address(raw.source_ips.first().cloned().unwrap_or_default())
        .user_agent(raw.user_agent.clone())
        .request_id(raw.audit_id.clone())
        .request_method(raw.verb.clone())
        .url(raw.request_uri.clone())
        .response_status(status)
        .event_type(EVENT_TYPE_USER_WRITE)
        .resource_report(ResourceReport {
            resource_type: object,
            resource_id: String::new(),
            resource_name: String::new(),
        });

    if let Some(user) = &raw.user {
        builder = builder.user_identity(user.username.clone());
    }
    if status != 200 {
        builder = builder.error_code(status.to_string());
    }
    builder.build()
}

/// Pull the acted-on resource out of the request URI.
///
/// Namespaced requests take the segment two past "namespaces"; cluster-scoped
/// requests take the segment after the API version.
fn resource_from_uri(uri: &str) -> String {
    let path = uri.split('?').next().unwrap_or_default();
    let parts: Vec<&str> = path.split('/').collect();
    let mut object = String::new();

    for (i, part) in parts.iter().enumerate() {
        if *part == "namespaces" {
            object = parts
                .get(i + 2)
                .copied()
                .unwrap_or("namespaces")
                .to_string();
            break;
        }
        if *part == "v1" {
            if let Some(next) = parts.get(i + 1) {
                if *next != "namespaces" {
                    object = (*next).to_string();
                }
            }
        }
    }
    object
}
