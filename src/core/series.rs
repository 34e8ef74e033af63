use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{AxisSide, Row};
use crate::error::{ChartError, ChartResult};

/// Measures whose values are durations (hover values carry `duration_unit`).
pub const DURATION_MEASURES: [&str; 10] = [
    "p75", "p95", "p98", "p99", "p999", "max", "mean", "median", "min", "std_dev",
];

/// Measures whose values are rates (hover values carry `rate_unit`).
pub const RATE_MEASURES: [&str; 4] = [
    "one_min_rate",
    "five_min_rate",
    "fifteen_min_rate",
    "mean_rate",
];

/// One metric selected on a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub environment: String,
    pub application: String,
    pub metric_name: String,
    pub measure: String,
    #[serde(default)]
    pub axis: AxisSide,
    #[serde(default)]
    pub duration_unit: Option<String>,
    #[serde(default)]
    pub rate_unit: Option<String>,
}

impl MetricConfig {
    #[must_use]
    pub fn new(
        environment: impl Into<String>,
        application: impl Into<String>,
        metric_name: impl Into<String>,
        measure: impl Into<String>,
    ) -> Self {
        Self {
            environment: environment.into(),
            application: application.into(),
            metric_name: metric_name.into(),
            measure: measure.into(),
            axis: AxisSide::Left,
            duration_unit: None,
            rate_unit: None,
        }
    }

    #[must_use]
    pub fn with_axis(mut self, axis: AxisSide) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub fn with_duration_unit(mut self, unit: impl Into<String>) -> Self {
        self.duration_unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_rate_unit(mut self, unit: impl Into<String>) -> Self {
        self.rate_unit = Some(unit.into());
        self
    }

    /// `<environment>.<application>.<metric_name>.<measure>`
    #[must_use]
    pub fn series_name(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.environment, self.application, self.metric_name, self.measure
        )
    }

    /// Unit appended to hover values for this metric's measure, if any.
    #[must_use]
    pub fn value_unit(&self) -> Option<&str> {
        let measure = self.measure.as_str();
        if DURATION_MEASURES.contains(&measure) {
            self.duration_unit.as_deref()
        } else if RATE_MEASURES.contains(&measure) {
            self.rate_unit.as_deref()
        } else {
            None
        }
    }
}

/// Identifying attributes decomposed from a dotted series name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesNameParts {
    pub environment: String,
    pub application: String,
    pub metric: String,
    pub measure: String,
}

impl SeriesNameParts {
    /// Splits on `.`: first part is the environment, second the application,
    /// last the measure, and everything in between the (dotted) metric name.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let parts: Vec<&str> = name.split('.').collect();
        let last = parts.len() - 1;
        let metric = if parts.len() > 3 {
            parts[2..last].join(".")
        } else {
            String::new()
        };
        Self {
            environment: parts[0].to_owned(),
            application: parts.get(1).copied().unwrap_or_default().to_owned(),
            metric,
            measure: parts[last].to_owned(),
        }
    }
}

/// A named, axis-assigned, time-ordered sequence of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub axis: AxisSide,
    pub rows: Vec<Row>,
    pub unit: Option<String>,
}

impl Series {
    #[must_use]
    pub fn new(name: impl Into<String>, axis: AxisSide, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            axis,
            rows,
            unit: None,
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: Option<String>) -> Self {
        self.unit = unit;
        self
    }

    /// First and last timestamps. Rows are sorted, so this is O(1).
    #[must_use]
    pub fn time_extent(&self) -> Option<(f64, f64)> {
        Some((self.rows.first()?.time, self.rows.last()?.time))
    }

    /// Min/max over defined values, skipping gaps.
    #[must_use]
    pub fn value_extent(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .filter_map(|row| row.value.filter(|value| value.is_finite()))
            .fold(None, |extent, value| match extent {
                None => Some((value, value)),
                Some((min, max)) => Some((f64::min(min, value), f64::max(max, value))),
            })
    }
}

/// Per-entry state of a data bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryState {
    Loading,
    Errored,
    Ready,
}

/// Fetch result for one metric.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BucketEntry {
    #[serde(default)]
    pub loading: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl BucketEntry {
    #[must_use]
    pub fn loading() -> Self {
        Self {
            loading: true,
            error: None,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn errored(message: impl Into<String>) -> Self {
        Self {
            loading: false,
            error: Some(message.into()),
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn ready(rows: Vec<Row>) -> Self {
        Self {
            loading: false,
            error: None,
            rows,
        }
    }

    #[must_use]
    pub fn state(&self) -> EntryState {
        if self.loading {
            EntryState::Loading
        } else if self.error.is_some() {
            EntryState::Errored
        } else {
            EntryState::Ready
        }
    }
}

/// Series name -> fetch result, in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataBucket {
    entries: IndexMap<String, BucketEntry>,
}

impl DataBucket {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entry(mut self, name: impl Into<String>, entry: BucketEntry) -> Self {
        self.insert(name, entry);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: BucketEntry) {
        self.entries.insert(name.into(), entry);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BucketEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BucketEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True while any entry is still waiting for its fetch.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.entries.values().any(|entry| entry.loading)
    }

    /// `(series name, message)` for every errored entry.
    #[must_use]
    pub fn errors(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(name, entry)| {
                entry
                    .error
                    .as_ref()
                    .map(|message| (name.clone(), message.clone()))
            })
            .collect()
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse data bucket: {e}")))
    }
}
