//! Auditrelay server binary.

use std::net::SocketAddr;

use anyhow::Result;
use auditrelay_config::SinkEndpoint;
use auditrelay_pipeline::{FeatureGate, GateWatcher, Pipeline, PipelineConfig, ShutdownHandle};
use auditrelay_server::AppState;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Auditrelay Server v{}", env!("CARGO_PKG_VERSION"));

    let webhook_configured = SinkEndpoint::from_webhook_env().is_some();
    let endpoint = SinkEndpoint::resolve();
    let port = auditrelay_config::listen_port()?;
    info!(sink = %endpoint.url(), webhook_configured, "resolved delivery sink");

    let gate = FeatureGate::new();
    let shutdown = ShutdownHandle::new();
    let pipeline = Pipeline::new(
        PipelineConfig::default(),
        &endpoint,
        gate.clone(),
        shutdown.clone(),
    )?;
    let submitter = pipeline.submitter();

    let (components_tx, components_rx) = mpsc::channel(16);
    tokio::spawn(GateWatcher::new(gate.clone(), webhook_configured).run(components_rx));
    tokio::spawn(pipeline.run());

    let state = AppState::new(submitter, gate, components_tx);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {addr}");

    axum::serve(listener, auditrelay_server::app(state))
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            shutdown.shutdown();
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
