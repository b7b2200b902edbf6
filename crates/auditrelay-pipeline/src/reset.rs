//! Fail-fast hard reset after sustained sink failure.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::deliver::DeliveryLimiter;
use crate::queue::IngestQueue;

/// Tracks failed send attempts across the whole process and trips a hard
/// reset at the threshold: the ingest queue and the delivery limiter are
/// both replaced, dropping whatever was buffered or considered in flight.
///
/// Deliberately not exponential backoff. A persistently failing sink makes
/// the pipeline forget and start clean, trading data loss for liveness.
/// Successful sends do NOT wind the counter back; it only returns to zero
/// when the reset trips.
pub struct FailureResetPolicy {
    threshold: u32,
    failures: AtomicU32,
    queue: Arc<IngestQueue>,
    limiter: Arc<DeliveryLimiter>,
}

impl FailureResetPolicy {
    /// Create a policy tripping after `threshold` failed attempts.
    pub fn new(threshold: u32, queue: Arc<IngestQueue>, limiter: Arc<DeliveryLimiter>) -> Self {
        Self {
            threshold,
            failures: AtomicU32::new(0),
            queue,
            limiter,
        }
    }

    /// Record one aborted send attempt.
    pub fn record_failure(&self) {
        let failures = self.failures.fetch_add(1, Ordering::AcqRel) + 1;
        if failures >= self.threshold {
            // Only the task that wins the swap performs the reset.
            if self.failures.swap(0, Ordering::AcqRel) >= self.threshold {
                self.hard_reset();
            }
        }
    }

    /// Failed attempts recorded since startup or the last reset.
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::Acquire)
    }

    fn hard_reset(&self) {
        let generation = self.queue.replace();
        self.limiter.replace();
        warn!(
            threshold = self.threshold,
            generation, "sink failures exceeded max, dropped buffered events and reset senders"
        );
    }
}
