//! OTLP over HTTP, JSON or protobuf by `Content-Type`.
//!
//! Exports are fire-and-forget: every request is answered 200 with an empty
//! export response in the request's encoding, including ones whose body
//! could not be decoded. Bodies are not size-limited.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, warn};

use otelview_core::ingest::ingest;
use otelview_core::protobuf::{self, DecodeError};
use otelview_core::telemetry::Telemetry;

use super::SharedSink;

const PROTOBUF: &str = "application/x-protobuf";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Encoding {
    Json,
    Protobuf,
}

impl Encoding {
    fn of(headers: &HeaderMap) -> Self {
        let protobuf = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(PROTOBUF));
        if protobuf {
            Encoding::Protobuf
        } else {
            Encoding::Json
        }
    }

    /// The empty export response. Every `Export*ServiceResponse` without a
    /// partial-success block encodes to zero bytes.
    fn reply(self) -> Response {
        match self {
            Encoding::Json => Json(json!({})).into_response(),
            Encoding::Protobuf => ([(CONTENT_TYPE, PROTOBUF)], Bytes::new()).into_response(),
        }
    }
}

pub fn router(sink: SharedSink) -> Router {
    Router::new()
        .route("/v1/logs", post(export_logs))
        .route("/v1/metrics", post(export_metrics))
        .route("/v1/traces", post(export_traces))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::disable())
        .with_state(sink)
}

pub async fn serve(listener: TcpListener, sink: SharedSink) {
    if let Err(err) = axum::serve(listener, router(sink)).await {
        error!(event = "listener_error", binding = "http", error = %err);
    }
}

async fn export_logs(State(sink): State<SharedSink>, headers: HeaderMap, body: Bytes) -> Response {
    accept(&sink, "logs", &headers, &body, Telemetry::Logs, protobuf::decode_logs).await
}

async fn export_metrics(State(sink): State<SharedSink>, headers: HeaderMap, body: Bytes) -> Response {
    accept(&sink, "metrics", &headers, &body, Telemetry::Metrics, protobuf::decode_metrics).await
}

async fn export_traces(State(sink): State<SharedSink>, headers: HeaderMap, body: Bytes) -> Response {
    accept(&sink, "traces", &headers, &body, Telemetry::Traces, protobuf::decode_traces).await
}

async fn accept<T>(
    sink: &SharedSink,
    kind: &'static str,
    headers: &HeaderMap,
    body: &[u8],
    wrap: fn(T) -> Telemetry,
    decode_protobuf: fn(&[u8]) -> Result<Telemetry, DecodeError>,
) -> Response
where
    T: DeserializeOwned,
{
    let encoding = Encoding::of(headers);
    let decoded = match encoding {
        Encoding::Json => serde_json::from_slice::<T>(body).map(wrap).map_err(|err| err.to_string()),
        Encoding::Protobuf => decode_protobuf(body).map_err(|err| err.to_string()),
    };

    match decoded {
        Ok(telemetry) => {
            ingest(sink.as_ref(), &telemetry).await;
        }
        Err(err) => {
            warn!(
                event = "decode_failed",
                binding = "http",
                kind,
                encoding = ?encoding,
                bytes = body.len(),
                error = %err
            );
        }
    }
    encoding.reply()
}
