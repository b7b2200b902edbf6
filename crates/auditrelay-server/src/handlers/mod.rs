//! Request handlers, one module per producer plus the status surface.

mod generic;
mod k8s;
mod platform;
mod status;
mod webconsole;

pub use generic::submit_generic;
pub use k8s::submit_k8s;
pub use platform::submit_platform;
pub use status::{delivery_enabled, healthz, push_components};
pub use webconsole::submit_webconsole;

use auditrelay_types::AuditEvent;

use crate::state::AppState;

/// Hand an event to the queue without delaying the producer's response.
/// A drop inside the bounded enqueue wait is logged by the queue itself.
pub(crate) fn enqueue_background(state: &AppState, event: AuditEvent) {
    let submitter = state.submitter.clone();
    tokio::spawn(async move {
        submitter.submit(event).await;
    });
}
