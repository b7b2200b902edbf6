//! Environment variable handling.

use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Environment variable names.
pub mod vars {
    /// Host of an externally configured sink webhook.
    pub const AUDIT_WEBHOOK_HOST: &str = "AUDIT_WEBHOOK_HOST";
    /// Index of an externally configured sink webhook.
    pub const AUDIT_WEBHOOK_INDEX: &str = "AUDIT_WEBHOOK_INDEX";
    /// Document type of an externally configured sink webhook.
    pub const AUDIT_WEBHOOK_TYPE: &str = "AUDIT_WEBHOOK_TYPE";
    /// Listen port for the ingestion server.
    pub const PORT: &str = "PORT";
}

/// Process environment accessor.
pub struct Environment;

impl Environment {
    /// Get an optional string variable. Empty values count as unset.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.is_empty())
    }
}
