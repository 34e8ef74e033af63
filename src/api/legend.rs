use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{AxisSide, SeriesGroups, SeriesNameParts, unix_seconds_to_datetime};
use crate::interaction::HoverState;
use crate::render::Color;

/// Hover timestamp format, rendered in UTC.
pub const LEGEND_DATE_FORMAT: &str = "%Y-%m-%d %-I:%M:%S %p";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegendColumn {
    Color,
    Axis,
    Environment,
    Application,
    Metric,
    Measure,
    Value,
    Date,
}

impl LegendColumn {
    /// Header text. Value and date columns have none.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Axis => "axis",
            Self::Environment => "environment",
            Self::Application => "application",
            Self::Metric => "metric",
            Self::Measure => "measure",
            Self::Value | Self::Date => "",
        }
    }

    #[must_use]
    pub const fn width_px(self) -> f64 {
        match self {
            Self::Color => 45.0,
            Self::Axis => 35.0,
            Self::Environment => 90.0,
            Self::Application => 110.0,
            Self::Metric => 220.0,
            Self::Measure => 100.0,
            Self::Value => 110.0,
            Self::Date => 170.0,
        }
    }
}

/// Legend columns, with the axis column only when both sides are populated.
#[must_use]
pub fn legend_columns(show_axis: bool) -> SmallVec<[LegendColumn; 8]> {
    let mut columns = SmallVec::new();
    columns.push(LegendColumn::Color);
    if show_axis {
        columns.push(LegendColumn::Axis);
    }
    columns.extend([
        LegendColumn::Environment,
        LegendColumn::Application,
        LegendColumn::Metric,
        LegendColumn::Measure,
        LegendColumn::Value,
        LegendColumn::Date,
    ]);
    columns
}

/// Left edge of each column.
#[must_use]
pub fn column_offsets(columns: &[LegendColumn]) -> SmallVec<[f64; 8]> {
    columns
        .iter()
        .scan(0.0, |x, column| {
            let left = *x;
            *x += column.width_px();
            Some(left)
        })
        .collect()
}

/// Hover value with two decimals and the metric unit, if any.
#[must_use]
pub fn format_hover_value(value: f64, unit: Option<&str>) -> String {
    match unit {
        Some(unit) => format!("{value:.2} {unit}"),
        None => format!("{value:.2}"),
    }
}

#[must_use]
pub fn format_hover_date(time: f64) -> String {
    unix_seconds_to_datetime(time)
        .map(|datetime| datetime.format(LEGEND_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// One series line of the legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendRow {
    pub name: String,
    pub color: Color,
    pub axis: Option<AxisSide>,
    pub parts: SeriesNameParts,
    pub value: Option<String>,
    pub date: Option<String>,
}

impl LegendRow {
    #[must_use]
    pub fn cell(&self, column: LegendColumn) -> String {
        match column {
            LegendColumn::Color => String::new(),
            LegendColumn::Axis => self.axis.map(AxisSide::label).unwrap_or_default().to_owned(),
            LegendColumn::Environment => self.parts.environment.clone(),
            LegendColumn::Application => self.parts.application.clone(),
            LegendColumn::Metric => self.parts.metric.clone(),
            LegendColumn::Measure => self.parts.measure.clone(),
            LegendColumn::Value => self.value.clone().unwrap_or_default(),
            LegendColumn::Date => self.date.clone().unwrap_or_default(),
        }
    }
}

/// Series bound on either pane, used to label legend rows.
#[derive(Debug, Clone, Copy)]
pub struct LegendSources<'a> {
    pub main: Option<&'a SeriesGroups>,
    pub preview: Option<&'a SeriesGroups>,
}

impl LegendSources<'_> {
    fn has_side(&self, side: AxisSide) -> bool {
        [self.main, self.preview]
            .into_iter()
            .flatten()
            .any(|groups| !groups.side(side).is_empty())
    }

    /// True when both the left and right side carry series on some pane.
    #[must_use]
    pub fn has_both_axes(&self) -> bool {
        self.has_side(AxisSide::Left) && self.has_side(AxisSide::Right)
    }

    fn find_axis(&self, name: &str) -> Option<AxisSide> {
        self.main
            .and_then(|groups| groups.find_axis(name))
            .or_else(|| self.preview.and_then(|groups| groups.find_axis(name)))
    }

    fn unit(&self, name: &str) -> Option<&str> {
        [self.main, self.preview]
            .into_iter()
            .flatten()
            .flat_map(SeriesGroups::iter)
            .find(|series| series.name == name)
            .and_then(|series| series.unit.as_deref())
    }
}

/// Builds legend rows for `keys` (the color-scale domain, in binding order).
pub fn build_legend_rows<'k>(
    keys: impl IntoIterator<Item = (&'k str, Color)>,
    sources: LegendSources<'_>,
    hover: &HoverState,
) -> Vec<LegendRow> {
    let show_axis = sources.has_both_axes();
    keys.into_iter()
        .map(|(name, color)| {
            let hovered = hover.value(name);
            LegendRow {
                name: name.to_owned(),
                color,
                axis: if show_axis {
                    sources.find_axis(name)
                } else {
                    None
                },
                parts: SeriesNameParts::parse(name),
                value: hovered.map(|hit| format_hover_value(hit.value, sources.unit(name))),
                date: hovered.map(|hit| format_hover_date(hit.time)),
            }
        })
        .collect()
}
