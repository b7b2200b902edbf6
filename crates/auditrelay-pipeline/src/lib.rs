//! Audit event buffering, batching, and delivery for Auditrelay.
//!
//! Producers hand events to a bounded in-memory queue; a driver loop drains
//! the queue into bounded batches and pushes them to a search/index sink
//! through a concurrency-limited sender. Delivery is best effort by design:
//! every wait in the pipeline is bounded, and sustained sink failure trips a
//! hard reset that drops buffered state rather than backing off forever.
//!
//! - Non-blocking event submission with a bounded enqueue wait
//! - Size-or-timeout batch collection
//! - Concurrency-limited, fire-and-forget batch delivery
//! - Fail-fast reset after sustained sink failure
//! - Runtime feature gate driven by an external component watch

mod batch;
mod deliver;
mod gate;
mod pipeline;
mod queue;
mod reset;

pub use batch::{BatchCollector, EventBatch};
pub use deliver::{BatchSender, DeliveryLimiter, SendError, SendOutcome};
pub use gate::{
    Component, ComponentSet, ComponentStatus, FeatureGate, GateWatcher, COMPONENT_AUDIT,
    COMPONENT_ELASTICSEARCH,
};
pub use pipeline::{Pipeline, PipelineConfig, ShutdownHandle, Submitter};
pub use queue::IngestQueue;
pub use reset::FailureResetPolicy;

// Re-export the event type for convenience.
pub use auditrelay_types::AuditEvent;
