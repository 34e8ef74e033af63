use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{ContinuousScale, Row, SeriesGroups};

/// Maximum screen distance between cursor and sample for a value to show.
pub const HOVER_TOLERANCE_PX: f64 = 3.0;

/// Index of the first row at or after `time`, searching from `lo`.
#[must_use]
pub fn bisect_left(rows: &[Row], time: f64, lo: usize) -> usize {
    let lo = lo.min(rows.len());
    lo + rows[lo..].partition_point(|row| row.time < time)
}

/// Row closest in time to `time`, preferring the left neighbour on ties.
#[must_use]
pub fn nearest_row(rows: &[Row], time: f64) -> Option<Row> {
    if rows.is_empty() {
        return None;
    }
    let index = bisect_left(rows, time, 1);
    let left = rows[index - 1];
    match rows.get(index) {
        None => Some(left),
        Some(&right) if time - left.time > right.time - time => Some(right),
        Some(_) => Some(left),
    }
}

/// Sample surfaced for a cursor at `pointer_x`, if one is close enough on screen.
#[must_use]
pub fn hovered_row(rows: &[Row], x_scale: ContinuousScale, pointer_x: f64) -> Option<Row> {
    let time = x_scale.invert(pointer_x)?;
    let row = nearest_row(rows, time)?;
    let row_x = x_scale.map(row.time)?;
    ((row_x - pointer_x).abs() < HOVER_TOLERANCE_PX && row.is_defined()).then_some(row)
}

/// Value shown in the legend for one hovered series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoverValue {
    pub time: f64,
    pub value: f64,
}

/// Cursor position over the main chart and the values found under it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoverState {
    pointer_x: Option<f64>,
    values: IndexMap<String, HoverValue>,
}

impl HoverState {
    #[must_use]
    pub fn pointer_x(&self) -> Option<f64> {
        self.pointer_x
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<HoverValue> {
        self.values.get(name).copied()
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, HoverValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.pointer_x.is_some()
    }

    /// Recomputes hovered values for every series in `groups`.
    pub fn track(&mut self, pointer_x: f64, groups: &SeriesGroups, x_scale: ContinuousScale) {
        self.pointer_x = Some(pointer_x);
        self.values.clear();
        for series in groups.iter() {
            let Some(row) = hovered_row(&series.rows, x_scale, pointer_x) else {
                continue;
            };
            if let Some(value) = row.value {
                self.values.insert(
                    series.name.clone(),
                    HoverValue {
                        time: row.time,
                        value,
                    },
                );
            }
        }
    }

    pub fn clear(&mut self) {
        self.pointer_x = None;
        self.values.clear();
    }
}
