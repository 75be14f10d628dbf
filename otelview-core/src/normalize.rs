//! Flatten decoded telemetry trees into [`Signal`]s.
//!
//! One signal per leaf record (log record, metric data point, span). Each
//! signal gets its own copies of the resource and scope property lists, so
//! per-leaf additions never leak into siblings. Shapes that have no display
//! mapping (exponential histograms, summaries, empty metrics) are skipped.

use crate::props::{Origin, PropertyList};
use crate::signal::{Signal, SignalKind, Timestamp};
use crate::telemetry::{
    HistogramDataPoint, InstrumentationScope, LogRecord, LogsData, Metric, MetricData,
    MetricsData, NumberDataPoint, Resource, Span, Telemetry, TracesData, severity_name,
    span_kind_name, status_code_name, temporality_name,
};

pub fn normalize(telemetry: &Telemetry) -> Vec<Signal> {
    match telemetry {
        Telemetry::Logs(logs) => normalize_logs(logs),
        Telemetry::Metrics(metrics) => normalize_metrics(metrics),
        Telemetry::Traces(traces) => normalize_traces(traces),
    }
}

fn resource_props(resource: &Resource) -> PropertyList {
    let mut props = PropertyList::new(Origin::Resource);
    props.add_attributes(&resource.attributes, "Attributes");
    props.add_number("DroppedAttributesCount", resource.dropped_attributes_count);
    props
}

fn scope_props(scope: &InstrumentationScope) -> PropertyList {
    let mut props = PropertyList::new(Origin::Scope);
    props.add_str("Name", scope.name.as_str());
    if !scope.version.is_empty() {
        props.add_str("Version", scope.version.as_str());
    }
    props.add_attributes(&scope.attributes, "Attributes");
    props
}

// --- logs ---

pub fn normalize_logs(logs: &LogsData) -> Vec<Signal> {
    let mut signals = Vec::new();
    for rl in &logs.resource_logs {
        let resource = resource_props(&rl.resource);
        for sl in &rl.scope_logs {
            let scope = scope_props(&sl.scope);
            for record in &sl.log_records {
                signals.push(log_signal(record, &scope, &resource));
            }
        }
    }
    signals
}

fn log_signal(record: &LogRecord, scope: &PropertyList, resource: &PropertyList) -> Signal {
    let body = record.body.as_text();

    let mut props = PropertyList::new(Origin::Record);
    props.add_attributes(&record.attributes, "Attributes");
    props.add_timestamp("Timestamp", Timestamp(record.time_unix_nano));
    props.add_timestamp("ObservedTimestamp", Timestamp(record.observed_time_unix_nano));
    props.add_str("TraceId", record.trace_id.as_str());
    props.add_str("SpanId", record.span_id.as_str());
    props.add_bool("Flags.IsSampled", record.flags & 1 == 1);
    props.add_str("SeverityText", record.severity_text.as_str());
    props.add_str("SeverityNumber", severity_name(record.severity_number));
    props.add_str("Body", body.as_str());

    Signal::new(
        SignalKind::Log,
        Timestamp(record.time_unix_nano),
        format!("{}: {}", record.severity_text, body),
        vec![props, scope.clone(), resource.clone()],
    )
}

// --- metrics ---

pub fn normalize_metrics(metrics: &MetricsData) -> Vec<Signal> {
    let mut signals = Vec::new();
    for rm in &metrics.resource_metrics {
        let resource = resource_props(&rm.resource);
        for sm in &rm.scope_metrics {
            let scope = scope_props(&sm.scope);
            for metric in &sm.metrics {
                metric_signals(metric, &scope, &resource, &mut signals);
            }
        }
    }
    signals
}

fn metric_signals(
    metric: &Metric,
    scope: &PropertyList,
    resource: &PropertyList,
    out: &mut Vec<Signal>,
) {
    let data = metric.data();

    let mut props = PropertyList::new(Origin::Metric);
    props.add_str("Type", data.type_name());
    props.add_str("Name", metric.name.as_str());
    props.add_str("Unit", metric.unit.as_str());
    props.add_str("Description", metric.description.as_str());

    match data {
        MetricData::Gauge(gauge) => {
            for point in &gauge.data_points {
                let (value, points) = number_point_props(point);
                out.push(Signal::new(
                    SignalKind::Metric,
                    Timestamp(point.time_unix_nano),
                    format!("{}={}", metric.name, value),
                    vec![points, props.clone(), scope.clone(), resource.clone()],
                ));
            }
        }
        MetricData::Sum(sum) => {
            let temporality = temporality_name(sum.aggregation_temporality);
            props.add_str("AggregationTemporality", temporality.as_str());
            props.add_bool("IsMonotonic", sum.is_monotonic);
            for point in &sum.data_points {
                let (value, points) = number_point_props(point);
                out.push(Signal::new(
                    SignalKind::Metric,
                    Timestamp(point.time_unix_nano),
                    format!("{}={} [{}]", metric.name, value, temporality),
                    vec![points, props.clone(), scope.clone(), resource.clone()],
                ));
            }
        }
        MetricData::Histogram(histogram) => {
            props.add_str(
                "AggregationTemporality",
                temporality_name(histogram.aggregation_temporality),
            );
            // Bucket counts and bounds are not flattened into rows.
            for point in &histogram.data_points {
                out.push(Signal::new(
                    SignalKind::Metric,
                    Timestamp(point.time_unix_nano),
                    format!("{}=HISTOGRAM", metric.name),
                    vec![
                        histogram_point_props(point),
                        props.clone(),
                        scope.clone(),
                        resource.clone(),
                    ],
                ));
            }
        }
        MetricData::ExponentialHistogram(_) | MetricData::Summary(_) | MetricData::Empty => {
            tracing::trace!(
                event = "metric_skipped",
                metric = %metric.name,
                kind = data.type_name()
            );
        }
    }
}

/// Returns the display value ("N/A" when neither int nor double is set) and
/// the data point property list.
fn number_point_props(point: &NumberDataPoint) -> (String, PropertyList) {
    let (value, value_type) = match (point.as_int, point.as_double) {
        (Some(i), _) => (i.to_string(), "Int"),
        (None, Some(d)) => (d.to_string(), "Double"),
        (None, None) => ("N/A".to_string(), "Empty"),
    };

    let mut props = PropertyList::new(Origin::DataPoint);
    props.add_bool("Flags.NoRecordedValue", point.no_recorded_value());
    props.add_number("Exemplars", point.exemplars.len());
    props.add_attributes(&point.attributes, "Attributes");
    props.add_timestamp("StartTimestamp", Timestamp(point.start_time_unix_nano));
    props.add_timestamp("Timestamp", Timestamp(point.time_unix_nano));
    props.add_str("Value", value.as_str());
    props.add_str("ValueType", value_type);
    (value, props)
}

fn histogram_point_props(point: &HistogramDataPoint) -> PropertyList {
    let mut props = PropertyList::new(Origin::DataPoint);
    props.add_bool("Flags.NoRecordedValue", point.no_recorded_value());
    props.add_number("Count", point.count);
    if let Some(sum) = point.sum {
        props.add_number("Sum", sum);
    }
    props.add_number("Exemplars", point.exemplars.len());
    props.add_attributes(&point.attributes, "Attributes");
    props.add_timestamp("StartTimestamp", Timestamp(point.start_time_unix_nano));
    props.add_timestamp("Timestamp", Timestamp(point.time_unix_nano));
    props
}

// --- traces ---

pub fn normalize_traces(traces: &TracesData) -> Vec<Signal> {
    let mut signals = Vec::new();
    for rs in &traces.resource_spans {
        let resource = resource_props(&rs.resource);
        for ss in &rs.scope_spans {
            let scope = scope_props(&ss.scope);
            for span in &ss.spans {
                signals.push(span_signal(span, &scope, &resource));
            }
        }
    }
    signals
}

fn span_signal(span: &Span, scope: &PropertyList, resource: &PropertyList) -> Signal {
    let kind = span_kind_name(span.kind);

    let mut props = PropertyList::new(Origin::Span);
    props.add_attributes(&span.attributes, "Attributes");
    props.add_str("Name", span.name.as_str());
    props.add_str("Kind", kind.as_str());
    props.add_str("TraceId", span.trace_id.as_str());
    props.add_str("SpanId", span.span_id.as_str());
    props.add_str("ParentSpanId", span.parent_span_id.as_str());
    props.add_timestamp("StartTimestamp", Timestamp(span.start_time_unix_nano));
    props.add_timestamp("EndTimestamp", Timestamp(span.end_time_unix_nano));
    props.add_str("Status.Code", status_code_name(span.status.code));
    props.add_str("Status.Message", span.status.message.as_str());
    props.add_number("Events", span.events.len());
    props.add_number("Links", span.links.len());
    props.add_number("DroppedAttributesCount", span.dropped_attributes_count);

    let summary = format!(
        "[{}], {}, {}, {}, {}, {}, {}",
        kind,
        span.status.message,
        span.name,
        span.trace_id,
        span.span_id,
        span.parent_span_id,
        span.events.len()
    );

    Signal::new(
        SignalKind::Trace,
        Timestamp(span.start_time_unix_nano),
        summary,
        vec![props, scope.clone(), resource.clone()],
    )
}
