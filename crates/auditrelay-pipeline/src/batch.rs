//! Batch collection with a size-or-timeout trigger.

use std::sync::Arc;
use std::time::Duration;

use auditrelay_types::AuditEvent;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::debug;

use crate::queue::IngestQueue;

/// Events collected within one window, delivered together.
#[derive(Debug)]
pub struct EventBatch {
    /// Events in collection (arrival) order.
    pub events: Vec<AuditEvent>,
    /// When the collection window opened.
    pub collected_at: Instant,
}

impl EventBatch {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            collected_at: Instant::now(),
        }
    }

    /// Number of events in the batch.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the window closed without collecting anything. A normal
    /// outcome; the driver skips dispatch for it.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Drains the ingest queue into bounded batches.
pub struct BatchCollector {
    queue: Arc<IngestQueue>,
    max_size: usize,
    max_wait: Duration,
    shutdown: broadcast::Receiver<()>,
}

impl BatchCollector {
    /// Create a collector over `queue`.
    pub fn new(
        queue: Arc<IngestQueue>,
        max_size: usize,
        max_wait: Duration,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            queue,
            max_size,
            max_wait,
            shutdown,
        }
    }

    /// Collect the next batch.
    ///
    /// Returns as soon as `max_size` events are in hand, or whatever
    /// accumulated once `max_wait` elapses (possibly nothing). `None` means
    /// shutdown was observed and no more batches will be produced.
    pub async fn collect(&mut self) -> Option<EventBatch> {
        let generation = self.queue.current();
        let mut rx = generation.rx.lock().await;
        let deadline = Instant::now() + self.max_wait;
        let mut batch = EventBatch::new();

        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(event) => {
                        batch.events.push(event);
                        if batch.len() >= self.max_size {
                            debug!("batch full at {} events", batch.len());
                            return Some(batch);
                        }
                    }
                    // Generation gone; hand back what we have.
                    None => return Some(batch),
                },
                _ = tokio::time::sleep_until(deadline) => {
                    return Some(batch);
                }
                _ = self.shutdown.recv() => {
                    debug!("collector observed shutdown");
                    return None;
                }
            }
        }
    }
}
