//! Scale/axis management and render orchestration.

mod axes;
mod axis_ticks;
mod chart;
mod color_scale;
mod layout;
mod legend;
mod render_pass;

pub use axes::{Axis, AxisScaleType, AxisSet};
pub use axis_ticks::{format_grouped, format_time_tick, time_axis_ticks, value_axis_ticks};
pub use chart::TimeSeriesChart;
pub use color_scale::OrdinalColorScale;
pub use layout::{
    ChartDimensions, LEGEND_ROW_HEIGHT_PX, MAIN_AXIS_BAND_PX, MAIN_HEIGHT_PX,
    MAIN_TOP_PADDING_PX, PREVIEW_AXIS_BAND_PX, PREVIEW_HEIGHT_PX, PREVIEW_TOP_PADDING_PX,
    PlotArea, SIDE_PADDING_PX,
};
pub use legend::{
    LEGEND_DATE_FORMAT, LegendColumn, LegendRow, LegendSources, build_legend_rows,
    column_offsets, format_hover_date, format_hover_value, legend_columns,
};
