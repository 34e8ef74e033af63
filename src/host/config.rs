use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::AxisScaleType;
use crate::core::{AxisSide, DataBucket, MetricConfig, TimeRange};
use crate::error::{ChartError, ChartResult};

/// Text shown over the main chart while the first fetch is in flight.
pub const LOADING_TEXT: &str = "Loading data...";

/// Chart configuration owned by the dashboard layer.
///
/// The host never mutates it; a new configuration is delivered by replacing
/// the `Rc` in [`ChartProps`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub left_axis: AxisScaleType,
    #[serde(default)]
    pub right_axis: AxisScaleType,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Zoomed sub-range of `[start, end]`; `None` shows the full range.
    #[serde(default)]
    pub selection: Option<TimeRange>,
    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
    #[serde(default)]
    pub initial_load: bool,
}

impl ChartConfig {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            left_axis: AxisScaleType::Linear,
            right_axis: AxisScaleType::Linear,
            start,
            end,
            selection: None,
            metrics: Vec::new(),
            initial_load: false,
        }
    }

    #[must_use]
    pub fn with_left_axis(mut self, scale_type: AxisScaleType) -> Self {
        self.left_axis = scale_type;
        self
    }

    #[must_use]
    pub fn with_right_axis(mut self, scale_type: AxisScaleType) -> Self {
        self.right_axis = scale_type;
        self
    }

    #[must_use]
    pub fn with_selection(mut self, selection: Option<TimeRange>) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn with_metric(mut self, metric: MetricConfig) -> Self {
        self.metrics.push(metric);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Vec<MetricConfig>) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub fn with_initial_load(mut self, initial_load: bool) -> Self {
        self.initial_load = initial_load;
        self
    }

    #[must_use]
    pub fn axis_scale(&self, side: AxisSide) -> AxisScaleType {
        match side {
            AxisSide::Left => self.left_axis,
            AxisSide::Right => self.right_axis,
        }
    }

    /// Full configured range shown by the preview pane.
    pub fn preview_range(&self) -> ChartResult<TimeRange> {
        TimeRange::from_datetimes(self.start, self.end)
    }

    /// Range shown by the main chart: the selection if any, else the full range.
    pub fn data_range(&self) -> ChartResult<TimeRange> {
        match self.selection {
            Some(selection) => Ok(selection),
            None => self.preview_range(),
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.end <= self.start {
            return Err(ChartError::InvalidData(format!(
                "chart range must end after it starts: {} .. {}",
                self.start, self.end
            )));
        }
        if let Some(selection) = self.selection {
            let ordered = selection.start.is_finite()
                && selection.end.is_finite()
                && selection.start <= selection.end;
            if !ordered || !self.preview_range()?.contains(selection) {
                return Err(ChartError::InvalidData(format!(
                    "selection {selection:?} must lie within the chart range"
                )));
            }
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse chart config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

/// Debounce delays applied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTuning {
    pub resize_debounce: Duration,
    pub selection_debounce: Duration,
}

impl Default for HostTuning {
    fn default() -> Self {
        Self {
            resize_debounce: Duration::from_millis(250),
            selection_debounce: Duration::from_millis(600),
        }
    }
}

/// Inputs handed to the host on mount and on every update.
///
/// Changes are detected by `Rc` identity, so callers replace a bucket to
/// signal new data instead of mutating it.
#[derive(Debug, Clone)]
pub struct ChartProps {
    pub config: Rc<ChartConfig>,
    pub preview_data: Rc<DataBucket>,
    pub data: Rc<DataBucket>,
}

impl ChartProps {
    #[must_use]
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config: Rc::new(config),
            preview_data: Rc::new(DataBucket::new()),
            data: Rc::new(DataBucket::new()),
        }
    }

    /// Same props with `config` replaced.
    #[must_use]
    pub fn with_config(&self, config: ChartConfig) -> Self {
        Self {
            config: Rc::new(config),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_preview_data(&self, bucket: DataBucket) -> Self {
        Self {
            preview_data: Rc::new(bucket),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_data(&self, bucket: DataBucket) -> Self {
        Self {
            data: Rc::new(bucket),
            ..self.clone()
        }
    }
}
