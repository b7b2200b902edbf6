//! Shared application state.

use auditrelay_pipeline::{ComponentSet, FeatureGate, Submitter};
use tokio::sync::mpsc;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Producer-facing pipeline handle.
    pub submitter: Submitter,
    /// Readable delivery flag.
    pub gate: FeatureGate,
    /// Feed into the gate watcher, the sole writer of the flag.
    pub components: mpsc::Sender<ComponentSet>,
}

impl AppState {
    /// Create the state.
    pub fn new(
        submitter: Submitter,
        gate: FeatureGate,
        components: mpsc::Sender<ComponentSet>,
    ) -> Self {
        Self {
            submitter,
            gate,
            components,
        }
    }
}
