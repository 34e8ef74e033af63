use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_seconds, unix_seconds_to_datetime};
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Y-axis side a series is plotted against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    #[default]
    Left,
    Right,
}

impl AxisSide {
    /// Short label used by the legend `axis` column.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Right => "R",
        }
    }
}

/// Identifies one of the six axes owned by a chart.
///
/// Main and preview panes keep independent axis instances so the preview can
/// stay on the full range while the main chart is zoomed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AxisId {
    X,
    Left,
    Right,
    XPreview,
    LeftPreview,
    RightPreview,
}

impl AxisId {
    #[must_use]
    pub const fn y(side: AxisSide, preview: bool) -> Self {
        match (side, preview) {
            (AxisSide::Left, false) => Self::Left,
            (AxisSide::Right, false) => Self::Right,
            (AxisSide::Left, true) => Self::LeftPreview,
            (AxisSide::Right, true) => Self::RightPreview,
        }
    }

    #[must_use]
    pub const fn x(preview: bool) -> Self {
        if preview { Self::XPreview } else { Self::X }
    }
}

/// Closed time interval expressed in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    /// Creates an ordered range; bounds are swapped when given in reverse.
    pub fn new(start: f64, end: f64) -> ChartResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ChartError::InvalidData(
                "time range bounds must be finite".to_owned(),
            ));
        }
        Ok(Self {
            start: start.min(end),
            end: start.max(end),
        })
    }

    pub fn from_datetimes(start: DateTime<Utc>, end: DateTime<Utc>) -> ChartResult<Self> {
        Self::new(datetime_to_unix_seconds(start), datetime_to_unix_seconds(end))
    }

    #[must_use]
    pub fn start_datetime(self) -> Option<DateTime<Utc>> {
        unix_seconds_to_datetime(self.start)
    }

    #[must_use]
    pub fn end_datetime(self) -> Option<DateTime<Utc>> {
        unix_seconds_to_datetime(self.end)
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.end - self.start
    }

    #[must_use]
    pub fn contains(self, other: TimeRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    #[must_use]
    pub fn as_tuple(self) -> (f64, f64) {
        (self.start, self.end)
    }
}

/// One sample of a series: unix-seconds timestamp plus an optional value.
///
/// `value == None` marks a gap; line paths break there instead of
/// interpolating between the neighbouring samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RowWire", into = "RowWire")]
pub struct Row {
    pub time: f64,
    pub value: Option<f64>,
}

impl Row {
    #[must_use]
    pub const fn new(time: f64, value: Option<f64>) -> Self {
        Self { time, value }
    }

    #[must_use]
    pub const fn value(time: f64, value: f64) -> Self {
        Self::new(time, Some(value))
    }

    #[must_use]
    pub const fn gap(time: f64) -> Self {
        Self::new(time, None)
    }

    #[must_use]
    pub fn at(time: DateTime<Utc>, value: Option<f64>) -> Self {
        Self::new(datetime_to_unix_seconds(time), value)
    }

    #[must_use]
    pub fn is_defined(self) -> bool {
        self.value.is_some_and(f64::is_finite)
    }
}

/// Metrics API wire shape: `[epoch_millis, value | null]`.
#[derive(Serialize, Deserialize)]
struct RowWire(f64, Option<f64>);

impl From<RowWire> for Row {
    fn from(wire: RowWire) -> Self {
        Self::new(wire.0 / 1000.0, wire.1)
    }
}

impl From<Row> for RowWire {
    fn from(row: Row) -> Self {
        Self(row.time * 1000.0, row.value)
    }
}
