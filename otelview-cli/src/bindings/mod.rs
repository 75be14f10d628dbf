//! Transport listeners feeding decoded telemetry into the dashboard queue.

mod grpc;
mod http;
mod stream;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

use otelview_core::config::ViewerConfig;
use otelview_core::ingest::TelemetrySink;
use otelview_core::signal::Signal;

pub type SharedSink = Arc<dyn TelemetrySink>;

/// Bind every enabled listener and spawn its accept loop. Bind failures are
/// returned; the accept loops run detached.
pub async fn spawn_all(config: &ViewerConfig, signals: mpsc::Sender<Signal>) -> anyhow::Result<()> {
    let sink: SharedSink = Arc::new(signals);

    if let Some(port) = config.http().active_port() {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("failed to listen for OTLP/HTTP on port {port}"))?;
        info!(event = "listener_start", binding = "http", port);
        tokio::spawn(http::serve(listener, sink.clone()));
    }

    if let Some(port) = config.grpc().active_port() {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("failed to listen for OTLP/gRPC on port {port}"))?;
        info!(event = "listener_start", binding = "grpc", port);
        tokio::spawn(grpc::serve(listener, sink.clone()));
    }

    if let Some(port) = config.stream().active_port() {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("failed to listen for OTLP streams on port {port}"))?;
        info!(event = "listener_start", binding = "stream", port);
        tokio::spawn(stream::serve(listener, sink));
    }

    Ok(())
}
