//! OTLP over gRPC: the collector `Export` RPCs for logs, metrics and traces.
//!
//! Every call is acknowledged with an empty export response.

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status, transport::Server};
use tracing::error;

use opentelemetry_proto::tonic::collector::logs::v1::{
    ExportLogsServiceRequest, ExportLogsServiceResponse,
    logs_service_server::{LogsService, LogsServiceServer},
};
use opentelemetry_proto::tonic::collector::metrics::v1::{
    ExportMetricsServiceRequest, ExportMetricsServiceResponse,
    metrics_service_server::{MetricsService, MetricsServiceServer},
};
use opentelemetry_proto::tonic::collector::trace::v1::{
    ExportTraceServiceRequest, ExportTraceServiceResponse,
    trace_service_server::{TraceService, TraceServiceServer},
};
use otelview_core::ingest::ingest;
use otelview_core::telemetry::Telemetry;

use super::SharedSink;

#[derive(Clone)]
pub struct GrpcIngest {
    sink: SharedSink,
}

impl GrpcIngest {
    pub fn new(sink: SharedSink) -> Self {
        Self { sink }
    }

    async fn accept(&self, telemetry: Telemetry) {
        ingest(self.sink.as_ref(), &telemetry).await;
    }
}

#[tonic::async_trait]
impl LogsService for GrpcIngest {
    async fn export(
        &self,
        request: Request<ExportLogsServiceRequest>,
    ) -> Result<Response<ExportLogsServiceResponse>, Status> {
        self.accept(request.into_inner().into()).await;
        Ok(Response::new(ExportLogsServiceResponse::default()))
    }
}

#[tonic::async_trait]
impl MetricsService for GrpcIngest {
    async fn export(
        &self,
        request: Request<ExportMetricsServiceRequest>,
    ) -> Result<Response<ExportMetricsServiceResponse>, Status> {
        self.accept(request.into_inner().into()).await;
        Ok(Response::new(ExportMetricsServiceResponse::default()))
    }
}

#[tonic::async_trait]
impl TraceService for GrpcIngest {
    async fn export(
        &self,
        request: Request<ExportTraceServiceRequest>,
    ) -> Result<Response<ExportTraceServiceResponse>, Status> {
        self.accept(request.into_inner().into()).await;
        Ok(Response::new(ExportTraceServiceResponse::default()))
    }
}

pub async fn serve(listener: TcpListener, sink: SharedSink) {
    let service = GrpcIngest::new(sink);
    let result = Server::builder()
        .add_service(LogsServiceServer::new(service.clone()).max_decoding_message_size(usize::MAX))
        .add_service(MetricsServiceServer::new(service.clone()).max_decoding_message_size(usize::MAX))
        .add_service(TraceServiceServer::new(service).max_decoding_message_size(usize::MAX))
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await;
    if let Err(err) = result {
        error!(event = "listener_error", binding = "grpc", error = %err);
    }
}
