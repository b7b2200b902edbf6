//! The driver loop tying collector, limiter, sender, and reset policy together.

use std::sync::Arc;
use std::time::Duration;

use auditrelay_config::SinkEndpoint;
use auditrelay_types::AuditEvent;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::batch::BatchCollector;
use crate::deliver::{dispatch, BatchSender, DeliveryLimiter};
use crate::gate::FeatureGate;
use crate::queue::IngestQueue;
use crate::reset::FailureResetPolicy;

/// Tunables for the pipeline. Defaults match the operational defaults the
/// service ships with.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Ingest queue capacity.
    pub queue_capacity: usize,
    /// How long a producer waits for queue space before dropping.
    pub enqueue_timeout: Duration,
    /// Maximum events per batch.
    pub batch_size: usize,
    /// Maximum time one collection window stays open.
    pub batch_wait: Duration,
    /// Maximum concurrent batch sends.
    pub max_concurrent_sends: usize,
    /// Per-call timeout against the sink, also the overall dispatch wait.
    pub send_timeout: Duration,
    /// How long a dispatch waits for a free delivery slot.
    pub acquire_timeout: Duration,
    /// Failed attempts before the hard reset trips.
    pub failure_threshold: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10_000,
            enqueue_timeout: Duration::from_secs(3),
            batch_size: 100,
            batch_wait: Duration::from_secs(3),
            max_concurrent_sends: 100,
            send_timeout: Duration::from_secs(3),
            acquire_timeout: Duration::from_secs(3),
            failure_threshold: 10,
        }
    }
}

/// A handle for coordinating graceful shutdown.
#[derive(Clone)]
pub struct ShutdownHandle {
    sender: broadcast::Sender<()>,
}

impl ShutdownHandle {
    /// Create a new shutdown handle.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Get a receiver for shutdown signals.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Signal shutdown to all receivers.
    pub fn shutdown(&self) {
        let _ = self.sender.send(());
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer-facing handle: bounded-wait submission, nothing else.
#[derive(Clone)]
pub struct Submitter {
    queue: Arc<IngestQueue>,
    timeout: Duration,
}

impl Submitter {
    /// Create a handle over `queue` with a fixed enqueue timeout.
    pub fn new(queue: Arc<IngestQueue>, timeout: Duration) -> Self {
        Self { queue, timeout }
    }

    /// Submit one event. Returns quickly; `false` means the event was
    /// dropped and has been logged, and the caller reports success anyway.
    pub async fn submit(&self, event: AuditEvent) -> bool {
        self.queue.enqueue_with_timeout(event, self.timeout).await
    }
}

/// The assembled delivery pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    queue: Arc<IngestQueue>,
    limiter: Arc<DeliveryLimiter>,
    sender: Arc<BatchSender>,
    policy: Arc<FailureResetPolicy>,
    gate: FeatureGate,
    shutdown: ShutdownHandle,
}

impl Pipeline {
    /// Assemble a pipeline delivering to `endpoint`.
    pub fn new(
        config: PipelineConfig,
        endpoint: &SinkEndpoint,
        gate: FeatureGate,
        shutdown: ShutdownHandle,
    ) -> Result<Self, reqwest::Error> {
        let queue = Arc::new(IngestQueue::new(config.queue_capacity));
        let limiter = Arc::new(DeliveryLimiter::new(config.max_concurrent_sends));
        let sender = Arc::new(BatchSender::new(endpoint, config.send_timeout)?);
        let policy = Arc::new(FailureResetPolicy::new(
            config.failure_threshold,
            queue.clone(),
            limiter.clone(),
        ));
        Ok(Self {
            config,
            queue,
            limiter,
            sender,
            policy,
            gate,
            shutdown,
        })
    }

    /// Producer-facing submission handle.
    pub fn submitter(&self) -> Submitter {
        Submitter {
            queue: self.queue.clone(),
            timeout: self.config.enqueue_timeout,
        }
    }

    /// The shared ingest queue.
    pub fn queue(&self) -> Arc<IngestQueue> {
        self.queue.clone()
    }

    /// The shared failure-reset policy.
    pub fn failure_policy(&self) -> Arc<FailureResetPolicy> {
        self.policy.clone()
    }

    /// Run the collect/dispatch loop until shutdown.
    ///
    /// Dispatch is fire-and-forget: the loop never waits for a batch to
    /// finish sending before opening the next collection window. Batches
    /// collected while the gate is disabled are discarded, not queued for
    /// later.
    pub async fn run(self) {
        let mut collector = BatchCollector::new(
            self.queue.clone(),
            self.config.batch_size,
            self.config.batch_wait,
            self.shutdown.subscribe(),
        );
        info!("audit delivery pipeline started");

        loop {
            let Some(batch) = collector.collect().await else {
                info!("audit delivery pipeline stopping");
                break;
            };
            if batch.is_empty() {
                continue;
            }
            if !self.gate.is_enabled() {
                debug!(count = batch.len(), "delivery disabled, batch discarded");
                continue;
            }

            tokio::spawn(dispatch(
                batch,
                self.limiter.clone(),
                self.sender.clone(),
                self.policy.clone(),
                self.config.acquire_timeout,
                self.config.send_timeout,
            ));
        }
    }
}
