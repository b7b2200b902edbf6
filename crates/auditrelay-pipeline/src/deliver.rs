//! Concurrency-limited batch delivery to the sink.

use std::sync::Arc;
use std::time::Duration;

use auditrelay_config::SinkEndpoint;
use auditrelay_types::AuditEvent;
use parking_lot::RwLock;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::batch::EventBatch;
use crate::reset::FailureResetPolicy;

/// Bounds the number of batch sends in flight at once.
///
/// Swappable: the hard-reset path replaces the semaphore wholesale. Permits
/// still held on the old one die with it, so the fresh limiter starts at
/// full capacity.
pub struct DeliveryLimiter {
    permits: usize,
    current: RwLock<Arc<Semaphore>>,
}

impl DeliveryLimiter {
    /// Create a limiter allowing `permits` concurrent sends.
    pub fn new(permits: usize) -> Self {
        Self {
            permits,
            current: RwLock::new(Arc::new(Semaphore::new(permits))),
        }
    }

    /// Acquire a delivery slot, waiting up to `timeout`. `None` means no
    /// slot freed up in time and the batch must be abandoned.
    pub async fn acquire(&self, timeout: Duration) -> Option<OwnedSemaphorePermit> {
        let semaphore = self.current.read().clone();
        match tokio::time::timeout(timeout, semaphore.acquire_owned()).await {
            Ok(Ok(permit)) => Some(permit),
            Ok(Err(_)) | Err(_) => None,
        }
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.current.read().available_permits()
    }

    pub(crate) fn replace(&self) {
        *self.current.write() = Arc::new(Semaphore::new(self.permits));
    }
}

/// Why a batch send stopped early.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The event could not be serialized. Does not count against the sink.
    #[error("serialize audit event failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The call to the sink failed outright.
    #[error("send audit event failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The sink answered with a non-2xx status.
    #[error("sink rejected audit event: status {0}")]
    Rejected(u16),
}

impl SendError {
    /// Whether this outcome counts toward the consecutive-failure counter.
    fn is_sink_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Rejected(_))
    }
}

/// Result of one batch send attempt.
#[derive(Debug)]
pub enum SendOutcome {
    /// Every event in the batch reached the sink.
    Delivered(usize),
    /// The send stopped at the first failing event; the remainder of the
    /// batch was not attempted. Partial delivery is a normal outcome.
    Aborted {
        /// Events that did reach the sink before the failure.
        sent: usize,
        /// The failure that stopped the batch.
        reason: SendError,
    },
}

/// Pushes batches to the sink, one POST per event.
pub struct BatchSender {
    url: String,
    client: reqwest::Client,
}

impl BatchSender {
    /// Build a sender for `endpoint` with a fixed per-call timeout.
    ///
    /// Certificate verification is disabled; the sink sits inside the same
    /// trust boundary and is frequently fronted by a self-signed proxy.
    pub fn new(endpoint: &SinkEndpoint, send_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(send_timeout)
            .build()?;
        Ok(Self {
            url: endpoint.url(),
            client,
        })
    }

    /// Send each event in order. The first failure aborts the rest of the
    /// batch; nothing is retried.
    pub async fn send(&self, batch: &EventBatch) -> SendOutcome {
        let mut sent = 0;
        for event in &batch.events {
            match self.send_one(event).await {
                Ok(()) => {
                    debug!(event_name = %event.event_name, "sent audit event");
                    sent += 1;
                }
                Err(reason) => {
                    error!(%reason, sent, "audit batch aborted");
                    return SendOutcome::Aborted { sent, reason };
                }
            }
        }
        SendOutcome::Delivered(sent)
    }

    async fn send_one(&self, event: &AuditEvent) -> Result<(), SendError> {
        let body = serde_json::to_vec(event)?;
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SendError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

/// One fire-and-forget delivery attempt: acquire a slot, push the batch, and
/// feed the failure policy.
///
/// The caller-visible wait is bounded by `overall_timeout`; an in-flight send
/// that outlives it keeps running and still settles the permit and counters.
pub(crate) async fn dispatch(
    batch: EventBatch,
    limiter: Arc<DeliveryLimiter>,
    sender: Arc<BatchSender>,
    policy: Arc<FailureResetPolicy>,
    acquire_timeout: Duration,
    overall_timeout: Duration,
) {
    let count = batch.len();
    let inner = tokio::spawn(async move {
        let Some(permit) = limiter.acquire(acquire_timeout).await else {
            info!(count, "no delivery slot within {:?}, batch abandoned", acquire_timeout);
            return;
        };

        let start = Instant::now();
        let outcome = sender.send(&batch).await;
        drop(permit);

        match outcome {
            SendOutcome::Delivered(sent) => {
                info!(sent, elapsed_ms = start.elapsed().as_millis() as u64, "sent audit batch");
            }
            SendOutcome::Aborted { sent, reason } => {
                if reason.is_sink_failure() {
                    policy.record_failure();
                }
                info!(
                    sent,
                    lost = count - sent,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "audit batch partially sent"
                );
            }
        }
    });

    if tokio::time::timeout(overall_timeout, inner).await.is_err() {
        info!("audit batch send still in flight after {:?}", overall_timeout);
    }
}
