//! Sink endpoint resolution.

use crate::env::{vars, Environment};

const DEFAULT_INTERNAL_HOST: &str = "http://elasticsearch-master.elasticsearch:9200";
const DEFAULT_INTERNAL_INDEX: &str = "audit";
const DEFAULT_INTERNAL_TYPE: &str = "logs";

/// Addressable delivery target: one document-create URL per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkEndpoint {
    /// Base host, including scheme.
    pub host: String,
    /// Index the events land in.
    pub index: String,
    /// Document type under the index.
    pub doc_type: String,
}

impl SinkEndpoint {
    /// Read an externally configured webhook from the environment.
    ///
    /// All three of host, index, and type must be present; a partial
    /// configuration resolves to `None`.
    pub fn from_webhook_env() -> Option<Self> {
        let host = Environment::get(vars::AUDIT_WEBHOOK_HOST)?;
        let index = Environment::get(vars::AUDIT_WEBHOOK_INDEX)?;
        let doc_type = Environment::get(vars::AUDIT_WEBHOOK_TYPE)?;
        Some(Self {
            host,
            index,
            doc_type,
        })
    }

    /// Resolve the delivery target, preferring the external webhook over the
    /// internally provisioned index.
    pub fn resolve() -> Self {
        Self::from_webhook_env().unwrap_or_else(Self::internal)
    }

    /// The internally provisioned sink.
    pub fn internal() -> Self {
        Self {
            host: DEFAULT_INTERNAL_HOST.to_string(),
            index: DEFAULT_INTERNAL_INDEX.to_string(),
            doc_type: DEFAULT_INTERNAL_TYPE.to_string(),
        }
    }

    /// Full URL events are POSTed to.
    pub fn url(&self) -> String {
        format!("{}/{}/{}", self.host, self.index, self.doc_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let endpoint = SinkEndpoint {
            host: "http://es:9200".into(),
            index: "audit".into(),
            doc_type: "logs".into(),
        };
        assert_eq!(endpoint.url(), "http://es:9200/audit/logs");
    }

    #[test]
    fn test_internal_default() {
        let endpoint = SinkEndpoint::internal();
        assert_eq!(
            endpoint.url(),
            "http://elasticsearch-master.elasticsearch:9200/audit/logs"
        );
    }

    // Env-reading paths mutate process state, so they share one test.
    #[test]
    fn test_webhook_env_requires_all_three() {
        std::env::remove_var(vars::AUDIT_WEBHOOK_HOST);
        std::env::remove_var(vars::AUDIT_WEBHOOK_INDEX);
        std::env::remove_var(vars::AUDIT_WEBHOOK_TYPE);
        assert!(SinkEndpoint::from_webhook_env().is_none());

        std::env::set_var(vars::AUDIT_WEBHOOK_HOST, "http://hook:9200");
        std::env::set_var(vars::AUDIT_WEBHOOK_INDEX, "ext");
        assert!(SinkEndpoint::from_webhook_env().is_none());

        std::env::set_var(vars::AUDIT_WEBHOOK_TYPE, "doc");
        let endpoint = SinkEndpoint::from_webhook_env().unwrap();
        assert_eq!(endpoint.url(), "http://hook:9200/ext/doc");
        assert_eq!(SinkEndpoint::resolve(), endpoint);

        std::env::remove_var(vars::AUDIT_WEBHOOK_HOST);
        std::env::remove_var(vars::AUDIT_WEBHOOK_INDEX);
        std::env::remove_var(vars::AUDIT_WEBHOOK_TYPE);
    }
}
