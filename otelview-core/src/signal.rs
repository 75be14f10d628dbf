use std::fmt;

use chrono::{DateTime, Utc};

use crate::props::PropertyList;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalKind {
    Log,
    Metric,
    Trace,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Log => write!(f, "LOG"),
            Self::Metric => write!(f, "METRIC"),
            Self::Trace => write!(f, "TRACE"),
        }
    }
}

/// Nanoseconds since the Unix epoch; zero means the producer did not say.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const UNKNOWN: Timestamp = Timestamp(0);

    pub fn is_known(&self) -> bool {
        self.0 > 0
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if !self.is_known() {
            return None;
        }
        let secs = (self.0 / 1_000_000_000) as i64;
        let nanos = (self.0 % 1_000_000_000) as u32;
        DateTime::from_timestamp(secs, nanos)
    }

    /// Millisecond precision, always 23 characters wide.
    pub fn short(&self) -> String {
        match self.to_datetime() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            None => "????-??-?? ??:??:??.???".to_string(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.9f UTC")),
            None => write!(f, "N/A"),
        }
    }
}

const ATTRIBUTE_PREFIX: &str = "Attributes.";

/// One normalized telemetry event ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signal {
    kind: SignalKind,
    time: Timestamp,
    summary: String,
    description: String,
    properties: Vec<PropertyList>,
}

impl Signal {
    /// Sorts every property list and derives the search text from their
    /// attribute rows, as `key=value` lines. `properties` is ordered
    /// most-specific first.
    pub fn new(
        kind: SignalKind,
        time: Timestamp,
        summary: impl Into<String>,
        mut properties: Vec<PropertyList>,
    ) -> Self {
        for list in &mut properties {
            list.sort();
        }
        let description = properties
            .iter()
            .flat_map(|list| list.rows())
            .filter_map(|p| {
                let key = p.name.strip_prefix(ATTRIBUTE_PREFIX)?;
                Some(format!("{}={}", key, p.value))
            })
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            kind,
            time,
            summary: summary.into(),
            description,
            properties,
        }
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    pub fn time(&self) -> Timestamp {
        self.time
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn properties(&self) -> &[PropertyList] {
        &self.properties
    }
}
