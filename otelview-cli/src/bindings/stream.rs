//! Newline-delimited OTLP/JSON over plain TCP.
//!
//! Each line is one complete `LogsData`, `MetricsData` or `TracesData`
//! document, which is what the collector's file exporter writes. A line that
//! fails to decode, invalid UTF-8 included, is logged and skipped; the
//! connection stays open.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, warn};

use otelview_core::ingest::ingest;
use otelview_core::telemetry::Telemetry;

use super::SharedSink;

pub async fn serve(listener: TcpListener, sink: SharedSink) {
    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                let sink = sink.clone();
                tokio::spawn(async move {
                    debug!(event = "stream_open", %peer);
                    let signals = read_documents(socket, peer, &sink).await;
                    debug!(event = "stream_closed", %peer, signals);
                });
            }
            Err(err) => {
                warn!(event = "accept_failed", binding = "stream", error = %err);
            }
        }
    }
}

/// Ingest every line of `reader` until EOF. Returns the number of signals
/// published.
async fn read_documents<R>(reader: R, peer: SocketAddr, sink: &SharedSink) -> usize
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).split(b'\n');
    let mut published = 0;
    loop {
        let segment = match lines.next_segment().await {
            Ok(Some(segment)) => segment,
            Ok(None) => break,
            Err(err) => {
                warn!(event = "stream_read_failed", %peer, error = %err);
                break;
            }
        };
        let line = segment.trim_ascii();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_slice::<Telemetry>(line) {
            Ok(telemetry) => published += ingest(sink.as_ref(), &telemetry).await,
            Err(err) => {
                warn!(event = "decode_failed", binding = "stream", %peer, bytes = line.len(), error = %err);
            }
        }
    }
    published
}
