//! metric-chart: headless, brushable dual-axis time-series charts.
//!
//! The crate is split the same way a dashboard chart is: a pure series and
//! scale core, pointer interaction, a retained keyed scene with pluggable
//! renderers, the chart orchestration API and a host that owns the mount,
//! update and unmount lifecycle plus its debounced timers.

pub mod api;
pub mod core;
pub mod error;
pub mod host;
pub mod interaction;
pub mod render;
pub mod telemetry;

#[cfg(feature = "gtk4-adapter")]
pub mod platform_gtk;

pub use api::{AxisScaleType, TimeSeriesChart};
pub use crate::core::{AxisSide, BucketEntry, DataBucket, MetricConfig, Row, TimeRange};
pub use error::{ChartError, ChartResult};
pub use host::{ChartConfig, ChartHost, ChartProps, HostMount, SharedChartHost, WindowEvents};
pub use render::{NullRenderer, Renderer};
