//! Delivery feature gate and the watcher that drives it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Component name carrying the audit feature flag.
pub const COMPONENT_AUDIT: &str = "audit";
/// Component name of the internally provisioned index sink.
pub const COMPONENT_ELASTICSEARCH: &str = "elasticsearch";

/// Process-wide switch for whether batches are dispatched to the sink.
///
/// Single writer (the [`GateWatcher`]), many readers. Eventual visibility is
/// all the design needs: a stale read costs at most one extra or one skipped
/// delivery cycle.
#[derive(Clone, Debug, Default)]
pub struct FeatureGate {
    enabled: Arc<AtomicBool>,
}

impl FeatureGate {
    /// Create a gate, initially disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether delivery is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

/// Enablement status of one platform component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is switched on.
    Enabled,
    /// Component is switched off.
    Disabled,
}

/// One platform component entry in the external configuration object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Component name, e.g. "audit".
    pub name: String,
    /// Current status.
    pub status: ComponentStatus,
}

/// Snapshot of the component set pushed by the external watch.
///
/// `components: None` models the source configuration being cleared, which
/// disables delivery outright.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentSet {
    /// The configured components, absent when the set was cleared.
    pub components: Option<Vec<Component>>,
}

/// Sole writer of the [`FeatureGate`].
///
/// Applies component-set snapshots as they arrive. Delivery turns on once
/// the audit flag is on AND a sink is resolved (an externally configured
/// webhook, or the internal index component seen enabled). An enabled
/// internal sink is sticky across snapshots; only an explicit audit-off or a
/// cleared component set turns delivery back off.
pub struct GateWatcher {
    gate: FeatureGate,
    webhook_configured: bool,
    audit_enabled: bool,
    internal_sink_enabled: bool,
}

impl GateWatcher {
    /// Create a watcher writing to `gate`. `webhook_configured` reports
    /// whether an external webhook sink was fully configured at startup.
    pub fn new(gate: FeatureGate, webhook_configured: bool) -> Self {
        Self {
            gate,
            webhook_configured,
            audit_enabled: false,
            internal_sink_enabled: false,
        }
    }

    /// Apply one snapshot. Idempotent; the last applied snapshot wins.
    pub fn apply(&mut self, set: &ComponentSet) {
        let Some(components) = &set.components else {
            warn!("component set cleared, audit delivery disabled");
            self.gate.set(false);
            return;
        };

        for component in components {
            match component.name.as_str() {
                COMPONENT_AUDIT => {
                    if component.status == ComponentStatus::Enabled {
                        self.audit_enabled = true;
                    } else {
                        self.gate.set(false);
                        return;
                    }
                }
                COMPONENT_ELASTICSEARCH => {
                    if component.status == ComponentStatus::Enabled {
                        self.internal_sink_enabled = true;
                    }
                }
                _ => {}
            }
        }

        let sink_resolved = self.webhook_configured || self.internal_sink_enabled;
        if self.audit_enabled && sink_resolved {
            self.gate.set(true);
        }
        debug!(
            enabled = self.gate.is_enabled(),
            sink_resolved, "applied component snapshot"
        );
    }

    /// Consume snapshots until the channel closes (process exit).
    pub async fn run(mut self, mut updates: mpsc::Receiver<ComponentSet>) {
        while let Some(snapshot) = updates.recv().await {
            self.apply(&snapshot);
        }
    }
}
