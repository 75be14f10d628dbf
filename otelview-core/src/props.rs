use std::cmp::Ordering;
use std::fmt::Display;

use crate::signal::Timestamp;
use crate::telemetry::KeyValue;

/// Which level of the telemetry tree a property list was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Resource,
    Scope,
    Metric,
    DataPoint,
    Record,
    Span,
}

impl Origin {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Resource => "Resource",
            Self::Scope => "Scope",
            Self::Metric => "Metric",
            Self::DataPoint => "DataPoint",
            Self::Record => "Record",
            Self::Span => "Span",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// Named key/value rows attached to a signal, one list per telemetry level.
///
/// Rows are appended by the normalizer in arrival order and sorted once with
/// [`PropertyList::sort`] before the owning signal is published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyList {
    origin: Origin,
    rows: Vec<Property>,
}

impl PropertyList {
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            rows: Vec::new(),
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn label(&self) -> &'static str {
        self.origin.label()
    }

    pub fn rows(&self) -> &[Property] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Add every attribute as `"{prefix}.{key}"` (or bare `key` when the
    /// prefix is empty).
    pub fn add_attributes(&mut self, attributes: &[KeyValue], prefix: &str) {
        for kv in attributes {
            let name = if prefix.is_empty() {
                kv.key.clone()
            } else {
                format!("{prefix}.{}", kv.key)
            };
            self.rows.push(Property {
                name,
                value: kv.value.as_text(),
            });
        }
    }

    pub fn add_str(&mut self, name: &str, value: impl Into<String>) {
        self.rows.push(Property {
            name: name.to_string(),
            value: value.into(),
        });
    }

    pub fn add_bool(&mut self, name: &str, value: bool) {
        self.add_str(name, if value { "True" } else { "False" });
    }

    pub fn add_number(&mut self, name: &str, value: impl Display) {
        self.add_str(name, value.to_string());
    }

    /// Zero timestamps are recorded as "N/A".
    pub fn add_timestamp(&mut self, name: &str, value: Timestamp) {
        self.add_str(name, value.to_string());
    }

    /// Stable sort by dotted key: segments compare case-insensitively, left
    /// to right, and a key that is a strict prefix of another comes first.
    pub fn sort(&mut self) {
        self.rows.sort_by(|a, b| compare_keys(&a.name, &b.name));
    }
}

pub fn compare_keys(a: &str, b: &str) -> Ordering {
    let left = a.split('.').map(str::to_lowercase);
    let right = b.split('.').map(str::to_lowercase);
    left.cmp(right)
}
