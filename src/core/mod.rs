pub mod line_series;
pub mod primitives;
pub mod scale;
pub mod series;
pub mod series_model;
pub mod types;

pub use line_series::{PathRun, project_path_runs};
pub use primitives::{datetime_to_unix_seconds, unix_seconds_to_datetime};
pub use scale::{ContinuousScale, ScaleKind};
pub use series::{
    BucketEntry, DataBucket, EntryState, MetricConfig, Series, SeriesNameParts,
};
pub use series_model::{
    SeriesGroups, SeriesModel, compute_x_domain, compute_y_domain, group_series,
    widen_flat_domain,
};
pub use types::{AxisId, AxisSide, Row, TimeRange, Viewport};
