//! Core audit event type.

use serde::{Deserialize, Serialize};

/// One audited action, in the canonical wire shape shared by every producer.
///
/// Events are immutable once constructed. The only identifying field is
/// `request_id`, which is a correlation hint supplied by the producer and is
/// NOT unique across sources; nothing may use it as a primary key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditEvent {
    /// When the event occurred, seconds since the Unix epoch.
    pub event_time: i64,
    /// Version of the event schema the producer emitted.
    pub event_version: String,
    /// Free-text classification, usually prefixed with the source.
    pub event_name: String,
    /// Human-readable description of the action.
    pub description: String,
    /// Client IP the audited request came from.
    pub source_ip_address: String,
    /// User agent of the audited request.
    pub user_agent: String,
    /// Correlation identifier supplied by the producer.
    pub request_id: String,
    /// HTTP method of the audited call.
    pub request_method: String,
    /// Raw request parameters, if the producer captured them.
    pub request_parameters: String,
    /// URL of the audited call.
    pub url: String,
    /// Response status of the audited call.
    pub response_status: i32,
    /// Error code when the audited call failed.
    pub error_code: String,
    /// Account that performed the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_identity: Option<UserIdentity>,
    /// Resources affected by the action, in producer order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_reports: Vec<ResourceReport>,
    /// Coarse category used for filtering, e.g. "userwrite".
    pub event_type: String,
}

/// Reference to the account that performed an audited action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserIdentity {
    /// Account identifier.
    pub account_id: String,
}

/// Descriptor of one resource affected by an audited action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceReport {
    /// Type of the resource.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional resource name.
    pub resource_name: String,
}

impl AuditEvent {
    /// Create a new event builder.
    pub fn builder() -> AuditEventBuilder {
        AuditEventBuilder::default()
    }
}

/// Builder for constructing audit events.
#[derive(Debug, Default)]
pub struct AuditEventBuilder {
    event: AuditEvent,
}

impl AuditEventBuilder {
    /// Set the event time (seconds since epoch).
    pub fn event_time(mut self, secs: i64) -> Self {
        self.event.event_time = secs;
        self
    }

    /// Set the schema version.
    pub fn event_version(mut self, version: impl Into<String>) -> Self {
        self.event.event_version = version.into();
        self
    }

    /// Set the event name.
    pub fn event_name(mut self, name: impl Into<String>) -> Self {
        self.event.event_name = name.into();
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.event.description = description.into();
        self
    }

    /// Set the source IP address.
    pub fn source_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.event.source_ip_address = ip.into();
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.event.user_agent = ua.into();
        self
    }

    /// Set the correlation identifier.
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.event.request_id = id.into();
        self
    }

    /// Set the request method.
    pub fn request_method(mut self, method: impl Into<String>) -> Self {
        self.event.request_method = method.into();
        self
    }

    /// Set the raw request parameters.
    pub fn request_parameters(mut self, params: impl Into<String>) -> Self {
        self.event.request_parameters = params.into();
        self
    }

    /// Set the request URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.event.url = url.into();
        self
    }

    /// Set the response status.
    pub fn response_status(mut self, status: i32) -> Self {
        self.event.response_status = status;
        self
    }

    /// Set the error code.
    pub fn error_code(mut self, code: impl Into<String>) -> Self {
        self.event.error_code = code.into();
        self
    }

    /// Set the acting account.
    pub fn user_identity(mut self, account_id: impl Into<String>) -> Self {
        self.event.user_identity = Some(UserIdentity {
            account_id: account_id.into(),
        });
        self
    }

    /// Add an affected resource.
    pub fn resource_report(mut self, report: ResourceReport) -> Self {
        self.event.resource_reports.push(report);
        self
    }

    /// Set the event type.
    pub fn event_type(mut self, ty: impl Into<String>) -> Self {
        self.event.event_type = ty.into();
        self
    }

    /// Build the event.
    pub fn build(self) -> AuditEvent {
        self.event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_produces_expected_fields() {
        let event = AuditEvent::builder()
            .event_time(1_700_000_000)
            .event_name("[generic] create user")
            .request_id("req-1")
            .response_status(201)
            .user_identity("admin")
            .resource_report(ResourceReport {
                resource_type: "user".into(),
                resource_id: "42".into(),
                resource_name: "alice".into(),
            })
            .build();

        assert_eq!(event.event_time, 1_700_000_000);
        assert_eq!(event.event_name, "[generic] create user");
        assert_eq!(event.response_status, 201);
        assert_eq!(event.user_identity.as_ref().unwrap().account_id, "admin");
        assert_eq!(event.resource_reports.len(), 1);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let event = AuditEvent::builder()
            .event_time(10)
            .event_name("probe")
            .source_ip_address("10.0.0.1")
            .build();

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventTime"], 10);
        assert_eq!(json["eventName"], "probe");
        assert_eq!(json["sourceIpAddress"], "10.0.0.1");
        // Empty optional sections stay off the wire.
        assert!(json.get("userIdentity").is_none());
        assert!(json.get("resourceReports").is_none());
    }

    #[test]
    fn test_partial_payload_deserializes_with_defaults() {
        let event: AuditEvent =
            serde_json::from_str(r#"{"eventName":"login","responseStatus":200}"#).unwrap();
        assert_eq!(event.event_name, "login");
        assert_eq!(event.response_status, 200);
        assert_eq!(event.event_time, 0);
        assert!(event.user_identity.is_none());
        assert!(event.resource_reports.is_empty());
    }
}
