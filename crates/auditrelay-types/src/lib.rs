//! Canonical audit event types for Auditrelay.

mod event;

pub use event::{AuditEvent, AuditEventBuilder, ResourceReport, UserIdentity};
