//! Bounded, swappable ingest queue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use auditrelay_types::AuditEvent;
use parking_lot::RwLock;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

/// One generation of the buffer. The hard-reset path replaces the whole
/// generation; whatever the old one still held becomes unreachable.
pub(crate) struct Generation {
    pub(crate) id: u64,
    tx: mpsc::Sender<AuditEvent>,
    pub(crate) rx: Mutex<mpsc::Receiver<AuditEvent>>,
}

impl Generation {
    fn new(id: u64, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            id,
            tx,
            rx: Mutex::new(rx),
        }
    }
}

/// Multi-producer, single-consumer buffer between the request handlers and
/// the batch collector.
///
/// Producers block for at most the enqueue timeout; a `false` return means
/// the event was dropped and the caller just logs. The current generation is
/// read under a short lock, so producers and the collector always see either
/// the old queue or the new one, never a torn state.
pub struct IngestQueue {
    capacity: usize,
    next_id: AtomicU64,
    current: RwLock<Arc<Generation>>,
}

impl IngestQueue {
    /// Create a queue bounded to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_id: AtomicU64::new(1),
            current: RwLock::new(Arc::new(Generation::new(0, capacity))),
        }
    }

    /// Enqueue `event`, waiting up to `timeout` for space.
    ///
    /// Returns `false` when the event was dropped because the queue stayed
    /// full for the whole window. Never surfaces to the producer's caller.
    pub async fn enqueue_with_timeout(&self, event: AuditEvent, timeout: Duration) -> bool {
        let request_id = event.request_id.clone();
        let tx = self.current.read().tx.clone();
        match tokio::time::timeout(timeout, tx.send(event)).await {
            Ok(Ok(())) => true,
            Ok(Err(_)) => {
                // Generation replaced out from under us; the event is lost.
                warn!(%request_id, "audit queue replaced during enqueue, event dropped");
                false
            }
            Err(_) => {
                info!(%request_id, "audit queue full, event dropped after {:?}", timeout);
                false
            }
        }
    }

    /// Identity of the current generation. Changes exactly when the queue is
    /// replaced by the failure-reset policy.
    pub fn generation(&self) -> u64 {
        self.current.read().id
    }

    /// Number of events currently buffered in this generation.
    pub fn buffered(&self) -> usize {
        let generation = self.current.read().clone();
        self.capacity - generation.tx.capacity()
    }

    pub(crate) fn current(&self) -> Arc<Generation> {
        self.current.read().clone()
    }

    /// Replace the buffer with a fresh, empty generation, discarding
    /// everything the old one held. Returns the new generation id.
    pub(crate) fn replace(&self) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let fresh = Arc::new(Generation::new(id, self.capacity));
        *self.current.write() = fresh;
        id
    }
}
