use indexmap::IndexMap;
use tracing::debug;

use crate::core::{AxisSide, DataBucket, EntryState, MetricConfig, Series};

/// Fractional widening applied to a flat (min == max) value domain.
pub const FLAT_DOMAIN_WIDEN_RATIO: f64 = 0.2;
/// Domain used when every value on a side is zero.
pub const ZERO_DOMAIN: (f64, f64) = (-5.0, 5.0);

/// Bound series split by axis side.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesGroups {
    pub left: Vec<Series>,
    pub right: Vec<Series>,
    /// Every bound series name in binding order.
    pub color_keys: Vec<String>,
}

impl SeriesGroups {
    #[must_use]
    pub fn side(&self, side: AxisSide) -> &[Series] {
        match side {
            AxisSide::Left => &self.left,
            AxisSide::Right => &self.right,
        }
    }

    /// Left series first, then right.
    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.left.iter().chain(self.right.iter())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    #[must_use]
    pub fn y_domain(&self, side: AxisSide) -> Option<(f64, f64)> {
        compute_y_domain(self.side(side))
    }

    /// Shared time extent across both sides.
    #[must_use]
    pub fn x_domain(&self) -> Option<(f64, f64)> {
        [compute_x_domain(&self.left), compute_x_domain(&self.right)]
            .into_iter()
            .flatten()
            .reduce(|(min, max), (lo, hi)| (min.min(lo), max.max(hi)))
    }

    #[must_use]
    pub fn find_axis(&self, name: &str) -> Option<AxisSide> {
        self.iter()
            .find(|series| series.name == name)
            .map(|series| series.axis)
    }
}

#[must_use]
pub fn group_series(series: Vec<Series>) -> SeriesGroups {
    let mut groups = SeriesGroups::default();
    for series in series {
        groups.color_keys.push(series.name.clone());
        match series.axis {
            AxisSide::Left => groups.left.push(series),
            AxisSide::Right => groups.right.push(series),
        }
    }
    groups
}

/// Combined value extent of `series`, widened when flat.
///
/// Returns `None` when no series has a defined value.
#[must_use]
pub fn compute_y_domain(series: &[Series]) -> Option<(f64, f64)> {
    let (min, max) = series
        .iter()
        .filter_map(Series::value_extent)
        .reduce(|(min, max), (lo, hi)| (min.min(lo), max.max(hi)))?;
    Some(widen_flat_domain(min, max))
}

#[must_use]
pub fn widen_flat_domain(min: f64, max: f64) -> (f64, f64) {
    if min != max {
        return (min, max);
    }
    if min == 0.0 {
        return ZERO_DOMAIN;
    }
    let delta = min.abs() * FLAT_DOMAIN_WIDEN_RATIO;
    (min - delta, max + delta)
}

/// Combined time extent from the first and last row of each series.
#[must_use]
pub fn compute_x_domain(series: &[Series]) -> Option<(f64, f64)> {
    series
        .iter()
        .filter_map(Series::time_extent)
        .reduce(|(min, max), (lo, hi)| (min.min(lo), max.max(hi)))
}

/// Resolves data buckets against the metrics configured on a chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesModel {
    metrics: IndexMap<String, MetricConfig>,
}

impl SeriesModel {
    #[must_use]
    pub fn new(metrics: &[MetricConfig]) -> Self {
        Self {
            metrics: metrics
                .iter()
                .map(|metric| (metric.series_name(), metric.clone()))
                .collect(),
        }
    }

    pub fn metrics(&self) -> impl Iterator<Item = &MetricConfig> {
        self.metrics.values()
    }

    #[must_use]
    pub fn is_configured(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    /// Groups the ready entries of `bucket` in configured-metric order.
    ///
    /// Entries naming no configured metric are ignored; they come from
    /// fetches that finished after the metric set changed. When every entry
    /// of a non-empty bucket is such a leftover, `None` is returned and the
    /// caller keeps what it had bound.
    #[must_use]
    pub fn bind(&self, bucket: &DataBucket) -> Option<SeriesGroups> {
        let stale = bucket
            .iter()
            .filter(|(name, _)| !self.is_configured(name))
            .count();
        if stale > 0 {
            debug!(stale, total = bucket.len(), "ignoring stale bucket entries");
        }
        if !bucket.is_empty() && stale == bucket.len() {
            return None;
        }

        let mut series = Vec::with_capacity(bucket.len() - stale);
        for (name, metric) in &self.metrics {
            let Some(entry) = bucket.get(name) else {
                continue;
            };
            match entry.state() {
                EntryState::Ready => series.push(
                    Series::new(name.clone(), metric.axis, entry.rows.clone())
                        .with_unit(metric.value_unit().map(str::to_owned)),
                ),
                state => debug!(series = %name, ?state, "skipping entry that is not ready"),
            }
        }

        Some(group_series(series))
    }
}

#[cfg(test)]
mod tests {
    use super::{compute_x_domain, compute_y_domain, widen_flat_domain};
    use crate::core::{AxisSide, Row, Series};

    #[test]
    fn y_domain_skips_gaps_and_empty_series() {
        let series = vec![
            Series::new("a", AxisSide::Left, vec![Row::value(0.0, 3.0), Row::gap(1.0)]),
            Series::new("b", AxisSide::Left, Vec::new()),
            Series::new("c", AxisSide::Left, vec![Row::value(0.0, -1.0), Row::value(2.0, 9.0)]),
        ];
        assert_eq!(compute_y_domain(&series), Some((-1.0, 9.0)));
        assert_eq!(compute_x_domain(&series), Some((0.0, 2.0)));
    }

    #[test]
    fn only_gaps_yield_no_domain() {
        let series = vec![Series::new("a", AxisSide::Left, vec![Row::gap(0.0)])];
        assert_eq!(compute_y_domain(&series), None);
        assert_eq!(compute_y_domain(&[]), None);
    }

    #[test]
    fn flat_negative_domain_keeps_order() {
        let (min, max) = widen_flat_domain(-5.0, -5.0);
        assert!(min < max);
        assert!((min + 6.0).abs() < 1e-12);
        assert!((max + 4.0).abs() < 1e-12);
    }
}
