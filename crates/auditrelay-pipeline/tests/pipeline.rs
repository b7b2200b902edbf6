//! End-to-end pipeline tests against a mock sink.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use auditrelay_config::SinkEndpoint;
use auditrelay_pipeline::{
    AuditEvent, BatchSender, DeliveryLimiter, EventBatch, FailureResetPolicy, FeatureGate,
    IngestQueue, Pipeline, PipelineConfig, SendOutcome, ShutdownHandle,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoint_for(server: &MockServer) -> SinkEndpoint {
    SinkEndpoint {
        host: server.uri(),
        index: "audit".to_string(),
        doc_type: "logs".to_string(),
    }
}

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        batch_wait: Duration::from_millis(200),
        enqueue_timeout: Duration::from_millis(500),
        ..PipelineConfig::default()
    }
}

fn event(id: usize) -> AuditEvent {
    AuditEvent::builder()
        .event_name(format!("event-{id}"))
        .request_id(format!("req-{id}"))
        .build()
}

fn enabled_gate() -> FeatureGate {
    // Tests drive the gate directly through a watcher-applied snapshot.
    let gate = FeatureGate::new();
    let mut watcher = auditrelay_pipeline::GateWatcher::new(gate.clone(), true);
    watcher.apply(&auditrelay_pipeline::ComponentSet {
        components: Some(vec![auditrelay_pipeline::Component {
            name: auditrelay_pipeline::COMPONENT_AUDIT.to_string(),
            status: auditrelay_pipeline::ComponentStatus::Enabled,
        }]),
    });
    gate
}

#[tokio::test]
async fn test_every_enqueued_event_reaches_the_sink_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audit/logs"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let gate = enabled_gate();
    let shutdown = ShutdownHandle::new();
    let pipeline = Pipeline::new(fast_config(), &endpoint_for(&server), gate, shutdown.clone())
        .expect("client build");
    let submitter = pipeline.submitter();
    tokio::spawn(pipeline.run());

    for i in 0..250 {
        assert!(submitter.submit(event(i)).await);
    }

    // Three collection windows (100, 100, 50) plus delivery slack.
    tokio::time::sleep(Duration::from_secs(2)).await;
    shutdown.shutdown();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 250);

    let mut seen = HashSet::new();
    for request in &requests {
        let body: AuditEvent = serde_json::from_slice(&request.body).unwrap();
        assert!(seen.insert(body.request_id.clone()), "event delivered twice");
    }
    assert_eq!(seen.len(), 250);
}

#[tokio::test]
async fn test_disabled_gate_performs_zero_network_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let gate = FeatureGate::new(); // stays disabled
    let shutdown = ShutdownHandle::new();
    let pipeline = Pipeline::new(fast_config(), &endpoint_for(&server), gate, shutdown.clone())
        .expect("client build");
    let submitter = pipeline.submitter();
    tokio::spawn(pipeline.run());

    for i in 0..20 {
        assert!(submitter.submit(event(i)).await);
    }

    tokio::time::sleep(Duration::from_secs(1)).await;
    shutdown.shutdown();
    // `expect(0)` verifies on drop of the mock server.
}

#[tokio::test]
async fn test_rejected_sends_feed_the_failure_counter_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audit/logs"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sender = BatchSender::new(&endpoint_for(&server), Duration::from_secs(3)).unwrap();
    let queue = Arc::new(IngestQueue::new(100));
    let limiter = Arc::new(DeliveryLimiter::new(10));
    let policy = FailureResetPolicy::new(10, queue, limiter);

    // Five single-event batches: five distinct attempts, five failures.
    for i in 0..5 {
        let batch = EventBatch {
            events: vec![event(i)],
            collected_at: tokio::time::Instant::now(),
        };
        match sender.send(&batch).await {
            SendOutcome::Aborted { sent, .. } => {
                assert_eq!(sent, 0);
                policy.record_failure();
            }
            SendOutcome::Delivered(_) => panic!("sink accepted a call it should reject"),
        }
    }

    assert_eq!(policy.failures(), 5);
    assert_eq!(server.received_requests().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_first_failure_aborts_the_rest_of_the_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audit/logs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let sender = BatchSender::new(&endpoint_for(&server), Duration::from_secs(3)).unwrap();
    let batch = EventBatch {
        events: (0..10).map(event).collect(),
        collected_at: tokio::time::Instant::now(),
    };

    match sender.send(&batch).await {
        SendOutcome::Aborted { sent, .. } => assert_eq!(sent, 0),
        SendOutcome::Delivered(_) => panic!("expected an aborted batch"),
    }
    // Only the first event was ever attempted.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_events_enqueued_before_a_toggle_still_deliver() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audit/logs"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let gate = FeatureGate::new();
    let shutdown = ShutdownHandle::new();
    let config = PipelineConfig {
        batch_wait: Duration::from_millis(500),
        ..fast_config()
    };
    let pipeline = Pipeline::new(config, &endpoint_for(&server), gate.clone(), shutdown.clone())
        .expect("client build");
    let submitter = pipeline.submitter();
    tokio::spawn(pipeline.run());

    // Enqueue while disabled, then enable before the collection window for
    // these events closes.
    for i in 0..3 {
        assert!(submitter.submit(event(i)).await);
    }
    let mut watcher = auditrelay_pipeline::GateWatcher::new(gate, true);
    watcher.apply(&auditrelay_pipeline::ComponentSet {
        components: Some(vec![auditrelay_pipeline::Component {
            name: auditrelay_pipeline::COMPONENT_AUDIT.to_string(),
            status: auditrelay_pipeline::ComponentStatus::Enabled,
        }]),
    });

    tokio::time::sleep(Duration::from_secs(2)).await;
    shutdown.shutdown();

    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}
