//! OTLP/protobuf input.
//!
//! The generated `opentelemetry-proto` messages arrive from gRPC and from
//! `application/x-protobuf` HTTP bodies. They are converted into the same
//! tree the JSON decoder produces, rendered the way OTLP/JSON spells them:
//! trace and span ids as lowercase hex, `bytesValue` as base64.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use prost::Message;
use serde_json::Value;

use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1 as common;
use opentelemetry_proto::tonic::logs::v1 as logs;
use opentelemetry_proto::tonic::metrics::v1 as metrics;
use opentelemetry_proto::tonic::resource::v1 as resource;
use opentelemetry_proto::tonic::trace::v1 as trace;

use crate::telemetry::{
    AnyValue, ArrayValue, ExponentialHistogram, Gauge, Histogram, HistogramDataPoint,
    InstrumentationScope, KeyValue, KeyValueList, LogRecord, LogsData, Metric, MetricsData,
    NumberDataPoint, Resource, ResourceLogs, ResourceMetrics, ResourceSpans, ScopeLogs,
    ScopeMetrics, ScopeSpans, Span, SpanEvent, SpanStatus, Sum, SummaryMetric, Telemetry,
    TracesData,
};

pub use prost::DecodeError;

pub fn decode_logs(buf: &[u8]) -> Result<Telemetry, DecodeError> {
    ExportLogsServiceRequest::decode(buf).map(Telemetry::from)
}

pub fn decode_metrics(buf: &[u8]) -> Result<Telemetry, DecodeError> {
    ExportMetricsServiceRequest::decode(buf).map(Telemetry::from)
}

pub fn decode_traces(buf: &[u8]) -> Result<Telemetry, DecodeError> {
    ExportTraceServiceRequest::decode(buf).map(Telemetry::from)
}

impl From<ExportLogsServiceRequest> for Telemetry {
    fn from(request: ExportLogsServiceRequest) -> Self {
        Telemetry::Logs(LogsData {
            resource_logs: request.resource_logs.into_iter().map(resource_logs).collect(),
        })
    }
}

impl From<ExportMetricsServiceRequest> for Telemetry {
    fn from(request: ExportMetricsServiceRequest) -> Self {
        Telemetry::Metrics(MetricsData {
            resource_metrics: request
                .resource_metrics
                .into_iter()
                .map(resource_metrics)
                .collect(),
        })
    }
}

impl From<ExportTraceServiceRequest> for Telemetry {
    fn from(request: ExportTraceServiceRequest) -> Self {
        Telemetry::Traces(TracesData {
            resource_spans: request.resource_spans.into_iter().map(resource_spans).collect(),
        })
    }
}

// --- shared levels ---

fn any_value(value: Option<common::AnyValue>) -> AnyValue {
    use common::any_value::Value as V;
    match value.and_then(|v| v.value) {
        Some(V::StringValue(s)) => AnyValue::string(s),
        Some(V::BoolValue(b)) => AnyValue::boolean(b),
        Some(V::IntValue(i)) => AnyValue::int(i),
        Some(V::DoubleValue(d)) => AnyValue::double(d),
        Some(V::ArrayValue(array)) => AnyValue {
            array_value: Some(ArrayValue {
                values: array.values.into_iter().map(|v| any_value(Some(v))).collect(),
            }),
            ..Default::default()
        },
        Some(V::KvlistValue(list)) => AnyValue {
            kvlist_value: Some(KeyValueList {
                values: attributes(list.values),
            }),
            ..Default::default()
        },
        Some(V::BytesValue(bytes)) => AnyValue {
            bytes_value: Some(BASE64.encode(bytes)),
            ..Default::default()
        },
        None => AnyValue::default(),
    }
}

fn attributes(pairs: Vec<common::KeyValue>) -> Vec<KeyValue> {
    pairs
        .into_iter()
        .map(|kv| KeyValue::new(kv.key, any_value(kv.value)))
        .collect()
}

fn resource(r: Option<resource::Resource>) -> Resource {
    let r = r.unwrap_or_default();
    Resource {
        attributes: attributes(r.attributes),
        dropped_attributes_count: r.dropped_attributes_count,
    }
}

fn scope(s: Option<common::InstrumentationScope>) -> InstrumentationScope {
    let s = s.unwrap_or_default();
    InstrumentationScope {
        name: s.name,
        version: s.version,
        attributes: attributes(s.attributes),
        dropped_attributes_count: s.dropped_attributes_count,
    }
}

/// Only the number of exemplars and links is shown.
fn opaque(count: usize) -> Vec<Value> {
    vec![Value::Null; count]
}

// --- logs ---

fn resource_logs(rl: logs::ResourceLogs) -> ResourceLogs {
    ResourceLogs {
        resource: resource(rl.resource),
        scope_logs: rl
            .scope_logs
            .into_iter()
            .map(|sl| ScopeLogs {
                scope: scope(sl.scope),
                log_records: sl.log_records.into_iter().map(log_record).collect(),
            })
            .collect(),
    }
}

fn log_record(record: logs::LogRecord) -> LogRecord {
    LogRecord {
        time_unix_nano: record.time_unix_nano,
        observed_time_unix_nano: record.observed_time_unix_nano,
        severity_number: record.severity_number,
        severity_text: record.severity_text,
        body: any_value(record.body),
        attributes: attributes(record.attributes),
        dropped_attributes_count: record.dropped_attributes_count,
        flags: record.flags,
        trace_id: hex::encode(record.trace_id),
        span_id: hex::encode(record.span_id),
    }
}

// --- metrics ---

fn resource_metrics(rm: metrics::ResourceMetrics) -> ResourceMetrics {
    ResourceMetrics {
        resource: resource(rm.resource),
        scope_metrics: rm
            .scope_metrics
            .into_iter()
            .map(|sm| ScopeMetrics {
                scope: scope(sm.scope),
                metrics: sm.metrics.into_iter().map(metric).collect(),
            })
            .collect(),
    }
}

fn metric(m: metrics::Metric) -> Metric {
    use metrics::metric::Data;

    let mut out = Metric {
        name: m.name,
        description: m.description,
        unit: m.unit,
        ..Default::default()
    };
    match m.data {
        Some(Data::Gauge(g)) => {
            out.gauge = Some(Gauge {
                data_points: g.data_points.into_iter().map(number_point).collect(),
            });
        }
        Some(Data::Sum(s)) => {
            out.sum = Some(Sum {
                data_points: s.data_points.into_iter().map(number_point).collect(),
                aggregation_temporality: s.aggregation_temporality,
                is_monotonic: s.is_monotonic,
            });
        }
        Some(Data::Histogram(h)) => {
            out.histogram = Some(Histogram {
                data_points: h.data_points.into_iter().map(histogram_point).collect(),
                aggregation_temporality: h.aggregation_temporality,
            });
        }
        Some(Data::ExponentialHistogram(e)) => {
            out.exponential_histogram = Some(ExponentialHistogram {
                data_points: opaque(e.data_points.len()),
                aggregation_temporality: e.aggregation_temporality,
            });
        }
        Some(Data::Summary(s)) => {
            out.summary = Some(SummaryMetric {
                data_points: opaque(s.data_points.len()),
            });
        }
        None => {}
    }
    out
}

fn number_point(point: metrics::NumberDataPoint) -> NumberDataPoint {
    use metrics::number_data_point::Value as V;

    let (as_int, as_double) = match point.value {
        Some(V::AsInt(i)) => (Some(i), None),
        Some(V::AsDouble(d)) => (None, Some(d)),
        None => (None, None),
    };
    NumberDataPoint {
        attributes: attributes(point.attributes),
        start_time_unix_nano: point.start_time_unix_nano,
        time_unix_nano: point.time_unix_nano,
        as_int,
        as_double,
        exemplars: opaque(point.exemplars.len()),
        flags: point.flags,
    }
}

fn histogram_point(point: metrics::HistogramDataPoint) -> HistogramDataPoint {
    HistogramDataPoint {
        attributes: attributes(point.attributes),
        start_time_unix_nano: point.start_time_unix_nano,
        time_unix_nano: point.time_unix_nano,
        count: point.count,
        sum: point.sum,
        bucket_counts: point.bucket_counts,
        explicit_bounds: point.explicit_bounds,
        exemplars: opaque(point.exemplars.len()),
        flags: point.flags,
    }
}

// --- traces ---

fn resource_spans(rs: trace::ResourceSpans) -> ResourceSpans {
    ResourceSpans {
        resource: resource(rs.resource),
        scope_spans: rs
            .scope_spans
            .into_iter()
            .map(|ss| ScopeSpans {
                scope: scope(ss.scope),
                spans: ss.spans.into_iter().map(span).collect(),
            })
            .collect(),
    }
}

fn span(s: trace::Span) -> Span {
    Span {
        trace_id: hex::encode(s.trace_id),
        span_id: hex::encode(s.span_id),
        parent_span_id: hex::encode(s.parent_span_id),
        name: s.name,
        kind: s.kind,
        start_time_unix_nano: s.start_time_unix_nano,
        end_time_unix_nano: s.end_time_unix_nano,
        attributes: attributes(s.attributes),
        dropped_attributes_count: s.dropped_attributes_count,
        events: s
            .events
            .into_iter()
            .map(|e| SpanEvent {
                time_unix_nano: e.time_unix_nano,
                name: e.name,
                attributes: attributes(e.attributes),
            })
            .collect(),
        links: opaque(s.links.len()),
        status: s
            .status
            .map(|st| SpanStatus {
                message: st.message,
                code: st.code,
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use common::any_value::Value as V;

    fn text(s: &str) -> Option<common::AnyValue> {
        Some(common::AnyValue {
            value: Some(V::StringValue(s.to_string())),
        })
    }

    fn logs_request() -> ExportLogsServiceRequest {
        ExportLogsServiceRequest {
            resource_logs: vec![logs::ResourceLogs {
                resource: Some(resource::Resource {
                    attributes: vec![common::KeyValue {
                        key: "service.name".into(),
                        value: text("checkout"),
                    }],
                    ..Default::default()
                }),
                scope_logs: vec![logs::ScopeLogs {
                    log_records: vec![logs::LogRecord {
                        severity_text: "WARN".into(),
                        body: text("disk low"),
                        trace_id: vec![0xab, 0xcd, 0x01],
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_logs_request_normalizes_like_json() {
        let signals = normalize(&Telemetry::from(logs_request()));
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].summary(), "WARN: disk low");

        let record = &signals[0].properties()[0];
        assert!(
            record
                .rows()
                .iter()
                .any(|p| p.name == "TraceId" && p.value == "abcd01")
        );
    }

    #[test]
    fn test_decode_wire_bytes() {
        let bytes = logs_request().encode_to_vec();
        let telemetry = decode_logs(&bytes).unwrap();
        assert_eq!(telemetry.kind_label(), "logs");
        assert_eq!(normalize(&telemetry).len(), 1);
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        assert!(decode_traces(&[0xff, 0xff, 0xff, 0xff]).is_err());
    }

    #[test]
    fn test_number_point_value_variants() {
        use metrics::number_data_point::Value as NV;

        let gauge = |value| metrics::Metric {
            name: "cpu".into(),
            data: Some(metrics::metric::Data::Gauge(metrics::Gauge {
                data_points: vec![metrics::NumberDataPoint {
                    value,
                    ..Default::default()
                }],
            })),
            ..Default::default()
        };
        let request = ExportMetricsServiceRequest {
            resource_metrics: vec![metrics::ResourceMetrics {
                scope_metrics: vec![metrics::ScopeMetrics {
                    metrics: vec![
                        gauge(Some(NV::AsInt(42))),
                        gauge(Some(NV::AsDouble(1.5))),
                        gauge(None),
                    ],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        };

        let summaries: Vec<String> = normalize(&Telemetry::from(request))
            .iter()
            .map(|s| s.summary().to_string())
            .collect();
        assert_eq!(summaries, vec!["cpu=42", "cpu=1.5", "cpu=N/A"]);
    }

    #[test]
    fn test_span_ids_and_status() {
        let request = ExportTraceServiceRequest {
            resource_spans: vec![trace::ResourceSpans {
                scope_spans: vec![trace::ScopeSpans {
                    spans: vec![trace::Span {
                        trace_id: vec![0x0a; 16],
                        span_id: vec![0x0b; 8],
                        name: "GET /cart".into(),
                        kind: 2,
                        status: Some(trace::Status {
                            message: "boom".into(),
                            code: 2,
                        }),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        };

        let signals = normalize(&Telemetry::from(request));
        assert_eq!(
            signals[0].summary(),
            format!("[Server], boom, GET /cart, {}, {}, , 0", "0a".repeat(16), "0b".repeat(8))
        );
    }

    #[test]
    fn test_bytes_value_is_base64() {
        let value = any_value(Some(common::AnyValue {
            value: Some(V::BytesValue(vec![1, 2, 3])),
        }));
        assert_eq!(value.as_text(), "AQID");
    }
}
