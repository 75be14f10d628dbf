//! Decoded OTLP telemetry trees.
//!
//! These types mirror the OTLP data model (resource → scope → leaf) and
//! deserialize from the OTLP/JSON encoding: camelCase keys, 64-bit integers
//! either as decimal strings or plain numbers, hex-encoded trace/span ids.
//! Everything defaults to empty so partially populated payloads still decode.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One decoded export request of any signal type.
///
/// Untagged: the variant is picked by the top-level key
/// (`resourceLogs`, `resourceMetrics` or `resourceSpans`).
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Telemetry {
    Logs(LogsData),
    Metrics(MetricsData),
    Traces(TracesData),
}

impl Telemetry {
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Logs(_) => "logs",
            Self::Metrics(_) => "metrics",
            Self::Traces(_) => "traces",
        }
    }
}

// --- attribute values ---

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnyValue {
    pub string_value: Option<String>,
    pub bool_value: Option<bool>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub int_value: Option<i64>,
    pub double_value: Option<f64>,
    pub array_value: Option<ArrayValue>,
    pub kvlist_value: Option<KeyValueList>,
    /// Base64 text exactly as it arrived on the wire.
    pub bytes_value: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArrayValue {
    pub values: Vec<AnyValue>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeyValueList {
    pub values: Vec<KeyValue>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeyValue {
    pub key: String,
    pub value: AnyValue,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: AnyValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl AnyValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            string_value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn int(value: i64) -> Self {
        Self {
            int_value: Some(value),
            ..Default::default()
        }
    }

    pub fn double(value: f64) -> Self {
        Self {
            double_value: Some(value),
            ..Default::default()
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            bool_value: Some(value),
            ..Default::default()
        }
    }

    /// Render the value as display text. Scalars print bare, arrays and
    /// key/value lists print as compact JSON, an empty value prints as "".
    pub fn as_text(&self) -> String {
        if let Some(s) = &self.string_value {
            s.clone()
        } else if let Some(b) = self.bool_value {
            b.to_string()
        } else if let Some(i) = self.int_value {
            i.to_string()
        } else if let Some(d) = self.double_value {
            d.to_string()
        } else if let Some(bytes) = &self.bytes_value {
            bytes.clone()
        } else if self.array_value.is_some() || self.kvlist_value.is_some() {
            self.to_json().to_string()
        } else {
            String::new()
        }
    }

    fn to_json(&self) -> Value {
        if let Some(s) = &self.string_value {
            Value::String(s.clone())
        } else if let Some(b) = self.bool_value {
            Value::Bool(b)
        } else if let Some(i) = self.int_value {
            Value::from(i)
        } else if let Some(d) = self.double_value {
            serde_json::Number::from_f64(d)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(d.to_string()))
        } else if let Some(array) = &self.array_value {
            Value::Array(array.values.iter().map(AnyValue::to_json).collect())
        } else if let Some(list) = &self.kvlist_value {
            Value::Object(
                list.values
                    .iter()
                    .map(|kv| (kv.key.clone(), kv.value.to_json()))
                    .collect(),
            )
        } else if let Some(bytes) = &self.bytes_value {
            Value::String(bytes.clone())
        } else {
            Value::Null
        }
    }
}

// --- shared envelope levels ---

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentationScope {
    pub name: String,
    pub version: String,
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
}

// --- logs ---

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogsData {
    pub resource_logs: Vec<ResourceLogs>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceLogs {
    pub resource: Resource,
    pub scope_logs: Vec<ScopeLogs>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeLogs {
    pub scope: InstrumentationScope,
    pub log_records: Vec<LogRecord>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LogRecord {
    #[serde(deserialize_with = "lenient::u64")]
    pub time_unix_nano: u64,
    #[serde(deserialize_with = "lenient::u64")]
    pub observed_time_unix_nano: u64,
    pub severity_number: i32,
    pub severity_text: String,
    pub body: AnyValue,
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
    pub flags: u32,
    pub trace_id: String,
    pub span_id: String,
}

// --- metrics ---

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsData {
    pub resource_metrics: Vec<ResourceMetrics>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceMetrics {
    pub resource: Resource,
    pub scope_metrics: Vec<ScopeMetrics>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeMetrics {
    pub scope: InstrumentationScope,
    pub metrics: Vec<Metric>,
}

/// A metric carries exactly one of the data shapes below; the first one
/// present wins (see [`Metric::data`]).
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Metric {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub gauge: Option<Gauge>,
    pub sum: Option<Sum>,
    pub histogram: Option<Histogram>,
    pub exponential_histogram: Option<ExponentialHistogram>,
    pub summary: Option<SummaryMetric>,
}

#[derive(Clone, Copy, Debug)]
pub enum MetricData<'a> {
    Gauge(&'a Gauge),
    Sum(&'a Sum),
    Histogram(&'a Histogram),
    ExponentialHistogram(&'a ExponentialHistogram),
    Summary(&'a SummaryMetric),
    Empty,
}

impl Metric {
    pub fn data(&self) -> MetricData<'_> {
        if let Some(g) = &self.gauge {
            MetricData::Gauge(g)
        } else if let Some(s) = &self.sum {
            MetricData::Sum(s)
        } else if let Some(h) = &self.histogram {
            MetricData::Histogram(h)
        } else if let Some(e) = &self.exponential_histogram {
            MetricData::ExponentialHistogram(e)
        } else if let Some(s) = &self.summary {
            MetricData::Summary(s)
        } else {
            MetricData::Empty
        }
    }
}

impl MetricData<'_> {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Gauge(_) => "Gauge",
            Self::Sum(_) => "Sum",
            Self::Histogram(_) => "Histogram",
            Self::ExponentialHistogram(_) => "ExponentialHistogram",
            Self::Summary(_) => "Summary",
            Self::Empty => "Empty",
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Gauge {
    pub data_points: Vec<NumberDataPoint>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Sum {
    pub data_points: Vec<NumberDataPoint>,
    pub aggregation_temporality: i32,
    pub is_monotonic: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Histogram {
    pub data_points: Vec<HistogramDataPoint>,
    pub aggregation_temporality: i32,
}

/// Decoded for completeness; points are kept opaque.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExponentialHistogram {
    pub data_points: Vec<Value>,
    pub aggregation_temporality: i32,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryMetric {
    pub data_points: Vec<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberDataPoint {
    pub attributes: Vec<KeyValue>,
    #[serde(deserialize_with = "lenient::u64")]
    pub start_time_unix_nano: u64,
    #[serde(deserialize_with = "lenient::u64")]
    pub time_unix_nano: u64,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub as_int: Option<i64>,
    pub as_double: Option<f64>,
    pub exemplars: Vec<Value>,
    pub flags: u32,
}

impl NumberDataPoint {
    /// Bit 0 of the data point flags.
    pub fn no_recorded_value(&self) -> bool {
        self.flags & 1 == 1
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HistogramDataPoint {
    pub attributes: Vec<KeyValue>,
    #[serde(deserialize_with = "lenient::u64")]
    pub start_time_unix_nano: u64,
    #[serde(deserialize_with = "lenient::u64")]
    pub time_unix_nano: u64,
    #[serde(deserialize_with = "lenient::u64")]
    pub count: u64,
    pub sum: Option<f64>,
    #[serde(deserialize_with = "lenient::u64_seq")]
    pub bucket_counts: Vec<u64>,
    pub explicit_bounds: Vec<f64>,
    pub exemplars: Vec<Value>,
    pub flags: u32,
}

impl HistogramDataPoint {
    pub fn no_recorded_value(&self) -> bool {
        self.flags & 1 == 1
    }
}

// --- traces ---

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TracesData {
    pub resource_spans: Vec<ResourceSpans>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceSpans {
    pub resource: Resource,
    pub scope_spans: Vec<ScopeSpans>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeSpans {
    pub scope: InstrumentationScope,
    pub spans: Vec<Span>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: String,
    pub name: String,
    pub kind: i32,
    #[serde(deserialize_with = "lenient::u64")]
    pub start_time_unix_nano: u64,
    #[serde(deserialize_with = "lenient::u64")]
    pub end_time_unix_nano: u64,
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
    pub events: Vec<SpanEvent>,
    pub links: Vec<Value>,
    pub status: SpanStatus,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SpanEvent {
    #[serde(deserialize_with = "lenient::u64")]
    pub time_unix_nano: u64,
    pub name: String,
    pub attributes: Vec<KeyValue>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpanStatus {
    pub message: String,
    pub code: i32,
}

// --- enum names ---

pub fn severity_name(number: i32) -> String {
    const BANDS: [&str; 6] = ["Trace", "Debug", "Info", "Warn", "Error", "Fatal"];
    match number {
        0 => "Unspecified".to_string(),
        1..=24 => {
            let band = BANDS[((number - 1) / 4) as usize];
            match (number - 1) % 4 {
                0 => band.to_string(),
                step => format!("{band}{}", step + 1),
            }
        }
        other => format!("SeverityNumber({other})"),
    }
}

pub fn span_kind_name(kind: i32) -> String {
    match kind {
        0 => "Unspecified".into(),
        1 => "Internal".into(),
        2 => "Server".into(),
        3 => "Client".into(),
        4 => "Producer".into(),
        5 => "Consumer".into(),
        other => format!("SpanKind({other})"),
    }
}

pub fn status_code_name(code: i32) -> String {
    match code {
        0 => "Unset".into(),
        1 => "Ok".into(),
        2 => "Error".into(),
        other => format!("StatusCode({other})"),
    }
}

pub fn temporality_name(temporality: i32) -> String {
    match temporality {
        0 => "Unspecified".into(),
        1 => "Delta".into(),
        2 => "Cumulative".into(),
        other => format!("AggregationTemporality({other})"),
    }
}

/// OTLP/JSON writes 64-bit integers as strings; producers in the wild also
/// send plain numbers. Accept both.
mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString<T> {
        Int(T),
        Str(String),
    }

    fn parse<T, E>(raw: IntOrString<T>) -> Result<T, E>
    where
        T: std::str::FromStr,
        E: serde::de::Error,
    {
        match raw {
            IntOrString::Int(v) => Ok(v),
            IntOrString::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid integer string {s:?}"))),
        }
    }

    pub fn u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let raw: Option<IntOrString<u64>> = Option::deserialize(d)?;
        raw.map(parse).transpose().map(Option::unwrap_or_default)
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let raw: Option<IntOrString<i64>> = Option::deserialize(d)?;
        raw.map(parse).transpose()
    }

    pub fn u64_seq<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u64>, D::Error> {
        let raw: Option<Vec<IntOrString<u64>>> = Option::deserialize(d)?;
        raw.unwrap_or_default().into_iter().map(parse).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_logs_from_otlp_json() {
        let json = r#"{
          "resourceLogs": [{
            "resource": {"attributes": [{"key": "service.name", "value": {"stringValue": "api"}}]},
            "scopeLogs": [{
              "scope": {"name": "my.lib"},
              "logRecords": [{
                "timeUnixNano": "1544712660300000000",
                "severityNumber": 9,
                "severityText": "INFO",
                "body": {"stringValue": "hello"},
                "traceId": "5b8efff798038103d269b633813fc60c"
              }]
            }]
          }]
        }"#;
        let telemetry: Telemetry = serde_json::from_str(json).unwrap();
        let Telemetry::Logs(logs) = telemetry else {
            panic!("expected logs");
        };
        let record = &logs.resource_logs[0].scope_logs[0].log_records[0];
        assert_eq!(record.time_unix_nano, 1_544_712_660_300_000_000);
        assert_eq!(record.severity_text, "INFO");
        assert_eq!(record.body.as_text(), "hello");
    }

    #[test]
    fn test_untagged_picks_variant_by_top_level_key() {
        let metrics: Telemetry = serde_json::from_str(r#"{"resourceMetrics": []}"#).unwrap();
        assert_eq!(metrics.kind_label(), "metrics");
        let traces: Telemetry = serde_json::from_str(r#"{"resourceSpans": []}"#).unwrap();
        assert_eq!(traces.kind_label(), "traces");
        assert!(serde_json::from_str::<Telemetry>(r#"{"something": []}"#).is_err());
    }

    #[test]
    fn test_integers_as_numbers_or_strings() {
        let point: NumberDataPoint =
            serde_json::from_str(r#"{"asInt": "42", "timeUnixNano": 7}"#).unwrap();
        assert_eq!(point.as_int, Some(42));
        assert_eq!(point.time_unix_nano, 7);

        let point: NumberDataPoint = serde_json::from_str(r#"{"asInt": -3}"#).unwrap();
        assert_eq!(point.as_int, Some(-3));
        assert_eq!(point.as_double, None);
    }

    #[test]
    fn test_metric_data_shape() {
        let metric: Metric =
            serde_json::from_str(r#"{"name": "m", "histogram": {"dataPoints": [{"count": "3"}]}}"#)
                .unwrap();
        assert_eq!(metric.data().type_name(), "Histogram");
        assert_eq!(Metric::default().data().type_name(), "Empty");
    }

    #[test]
    fn test_any_value_text() {
        assert_eq!(AnyValue::int(2).as_text(), "2");
        assert_eq!(AnyValue::boolean(true).as_text(), "true");
        assert_eq!(AnyValue::double(1.5).as_text(), "1.5");
        assert_eq!(AnyValue::default().as_text(), "");

        let list = AnyValue {
            array_value: Some(ArrayValue {
                values: vec![AnyValue::string("a"), AnyValue::int(1)],
            }),
            ..Default::default()
        };
        assert_eq!(list.as_text(), r#"["a",1]"#);
    }

    #[test]
    fn test_enum_names() {
        assert_eq!(severity_name(0), "Unspecified");
        assert_eq!(severity_name(9), "Info");
        assert_eq!(severity_name(10), "Info2");
        assert_eq!(severity_name(24), "Fatal4");
        assert_eq!(span_kind_name(2), "Server");
        assert_eq!(status_code_name(2), "Error");
        assert_eq!(temporality_name(2), "Cumulative");
    }
}
