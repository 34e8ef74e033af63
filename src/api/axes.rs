use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{AxisId, AxisSide, ContinuousScale, ScaleKind, SeriesGroups, TimeRange};
use crate::error::ChartError;
use crate::render::Pane;

use super::layout::ChartDimensions;

/// Scale type selectable for a y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AxisScaleType {
    #[default]
    Linear,
    Log,
}

impl AxisScaleType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Log => "log",
        }
    }

    #[must_use]
    pub const fn scale_kind(self) -> ScaleKind {
        match self {
            Self::Linear => ScaleKind::Linear,
            Self::Log => ScaleKind::Log,
        }
    }
}

impl FromStr for AxisScaleType {
    type Err = ChartError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "linear" => Ok(Self::Linear),
            "log" => Ok(Self::Log),
            other => Err(ChartError::InvalidScaleType(other.to_owned())),
        }
    }
}

impl TryFrom<String> for AxisScaleType {
    type Error = ChartError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AxisScaleType> for String {
    fn from(value: AxisScaleType) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for AxisScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scale plus the bookkeeping needed to recompute or pin its domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    scale: ContinuousScale,
    data_domain: Option<(f64, f64)>,
    user_defined_domain: bool,
    visible: bool,
}

impl Axis {
    #[must_use]
    pub fn new(kind: ScaleKind) -> Self {
        Self {
            scale: ContinuousScale::new(kind),
            data_domain: None,
            user_defined_domain: false,
            visible: kind == ScaleKind::Time,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ScaleKind {
        self.scale.kind()
    }

    #[must_use]
    pub fn scale(&self) -> ContinuousScale {
        self.scale
    }

    /// Domain currently applied to the scale (after nice rounding).
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.scale.domain()
    }

    /// Last domain computed from bound series, before nice rounding.
    #[must_use]
    pub fn data_domain(&self) -> Option<(f64, f64)> {
        self.data_domain
    }

    #[must_use]
    pub fn is_user_defined(&self) -> bool {
        self.user_defined_domain
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_range(&mut self, start: f64, end: f64) {
        self.scale.set_range(start, end);
    }

    fn swap_kind(&mut self, kind: ScaleKind) {
        let (r0, r1) = self.scale.range();
        let (d0, d1) = self.data_domain.unwrap_or_else(|| self.scale.domain());
        self.scale = ContinuousScale::new(kind)
            .with_range(r0, r1)
            .with_domain(d0, d1);
        self.scale.nice();
    }

    fn apply_data_domain(&mut self, domain: (f64, f64)) {
        self.data_domain = Some(domain);
        self.scale.set_domain(domain.0, domain.1);
        self.scale.nice();
    }

    fn pin(&mut self, range: TimeRange) {
        self.user_defined_domain = true;
        self.scale.set_domain(range.start, range.end);
    }

    fn unpin(&mut self) {
        self.user_defined_domain = false;
    }
}

/// The six axes of a chart: shared-time x, left y and right y, each for the
/// main and the preview pane.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSet {
    left_type: AxisScaleType,
    right_type: AxisScaleType,
    x: Axis,
    left: Axis,
    right: Axis,
    x_preview: Axis,
    left_preview: Axis,
    right_preview: Axis,
}

impl Default for AxisSet {
    fn default() -> Self {
        Self {
            left_type: AxisScaleType::Linear,
            right_type: AxisScaleType::Linear,
            x: Axis::new(ScaleKind::Time),
            left: Axis::new(ScaleKind::Linear),
            right: Axis::new(ScaleKind::Linear),
            x_preview: Axis::new(ScaleKind::Time),
            left_preview: Axis::new(ScaleKind::Linear),
            right_preview: Axis::new(ScaleKind::Linear),
        }
    }
}

impl AxisSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: AxisId) -> &Axis {
        match id {
            AxisId::X => &self.x,
            AxisId::Left => &self.left,
            AxisId::Right => &self.right,
            AxisId::XPreview => &self.x_preview,
            AxisId::LeftPreview => &self.left_preview,
            AxisId::RightPreview => &self.right_preview,
        }
    }

    fn get_mut(&mut self, id: AxisId) -> &mut Axis {
        match id {
            AxisId::X => &mut self.x,
            AxisId::Left => &mut self.left,
            AxisId::Right => &mut self.right,
            AxisId::XPreview => &mut self.x_preview,
            AxisId::LeftPreview => &mut self.left_preview,
            AxisId::RightPreview => &mut self.right_preview,
        }
    }

    #[must_use]
    pub fn scale(&self, id: AxisId) -> ContinuousScale {
        self.get(id).scale()
    }

    #[must_use]
    pub fn scale_type(&self, side: AxisSide) -> AxisScaleType {
        match side {
            AxisSide::Left => self.left_type,
            AxisSide::Right => self.right_type,
        }
    }

    /// Swaps the scale of `side` on both panes.
    ///
    /// The domain last computed from data is carried over unchanged and nice
    /// rounding is reapplied for linear scales, so a round trip through log
    /// lands on the same linear domain.
    pub fn set_axis_type(&mut self, side: AxisSide, scale_type: AxisScaleType) {
        match side {
            AxisSide::Left => self.left_type = scale_type,
            AxisSide::Right => self.right_type = scale_type,
        }
        for preview in [false, true] {
            let id = AxisId::y(side, preview);
            let axis = self.get_mut(id);
            axis.swap_kind(scale_type.scale_kind());
            if !axis.scale.has_valid_domain() && axis.data_domain.is_some() {
                warn!(axis = ?id, domain = ?axis.domain(), "log scale over a non-positive domain");
            }
        }
        debug!(?side, %scale_type, "axis scale type changed");
    }

    /// Pins the main x domain, or returns it to data tracking on `None`.
    pub fn set_x_domain(&mut self, range: Option<TimeRange>, groups: Option<&SeriesGroups>) {
        self.set_time_domain(AxisId::X, range, groups);
    }

    pub fn set_x_preview_domain(
        &mut self,
        range: Option<TimeRange>,
        groups: Option<&SeriesGroups>,
    ) {
        self.set_time_domain(AxisId::XPreview, range, groups);
    }

    fn set_time_domain(
        &mut self,
        id: AxisId,
        range: Option<TimeRange>,
        groups: Option<&SeriesGroups>,
    ) {
        let axis = self.get_mut(id);
        match range {
            Some(range) => axis.pin(range),
            None => {
                axis.unpin();
                if let Some((start, end)) = groups.and_then(SeriesGroups::x_domain) {
                    axis.scale.set_domain(start, end);
                }
            }
        }
        debug!(axis = ?id, ?range, "time domain updated");
    }

    /// Recomputes the domains of `pane` from freshly bound groups.
    ///
    /// A y side without values is hidden and keeps its previous domain. The
    /// x domain is left alone while pinned.
    pub fn apply_groups(&mut self, pane: Pane, groups: &SeriesGroups) {
        let preview = pane == Pane::Preview;
        for side in [AxisSide::Left, AxisSide::Right] {
            let id = AxisId::y(side, preview);
            let has_series = !groups.side(side).is_empty();
            let domain = groups.y_domain(side);
            let axis = self.get_mut(id);
            axis.visible = has_series && domain.is_some();
            if let Some(domain) = domain {
                axis.apply_data_domain(domain);
                if !axis.scale.has_valid_domain() {
                    warn!(axis = ?id, ?domain, "log scale over a non-positive domain");
                }
            }
        }

        let x = self.get_mut(AxisId::x(preview));
        if !x.user_defined_domain {
            if let Some((start, end)) = groups.x_domain() {
                x.scale.set_domain(start, end);
            }
        }
        debug!(
            ?pane,
            left = ?self.get(AxisId::y(AxisSide::Left, preview)).domain(),
            right = ?self.get(AxisId::y(AxisSide::Right, preview)).domain(),
            x = ?self.get(AxisId::x(preview)).domain(),
            "domains recomputed"
        );
    }

    /// Maps every axis onto the pixel bands of `dims`.
    pub fn set_ranges(&mut self, dims: &ChartDimensions) {
        let main = dims.main;
        let preview = dims.preview;
        self.x.set_range(main.left, main.right);
        self.left.set_range(main.bottom, main.top);
        self.right.set_range(main.bottom, main.top);
        self.x_preview.set_range(preview.left, preview.right);
        self.left_preview.set_range(preview.bottom, preview.top);
        self.right_preview.set_range(preview.bottom, preview.top);
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisScaleType, AxisSet};
    use crate::core::{AxisId, AxisSide, Row, Series, TimeRange, group_series};
    use crate::error::ChartError;
    use crate::render::Pane;

    fn groups(values: &[f64]) -> crate::core::SeriesGroups {
        let rows = values
            .iter()
            .enumerate()
            .map(|(i, v)| Row::value(i as f64, *v))
            .collect();
        group_series(vec![Series::new("a.b.c.d", AxisSide::Left, rows)])
    }

    #[test]
    fn scale_type_strings_are_validated() {
        assert_eq!("log".parse::<AxisScaleType>().ok(), Some(AxisScaleType::Log));
        assert!(matches!(
            "time".parse::<AxisScaleType>(),
            Err(ChartError::InvalidScaleType(value)) if value == "time"
        ));
    }

    #[test]
    fn pinned_x_domain_survives_data_updates() {
        let mut axes = AxisSet::new();
        let pinned = TimeRange::new(100.0, 200.0).expect("range");
        axes.set_x_domain(Some(pinned), None);
        axes.apply_groups(Pane::Main, &groups(&[1.0, 2.0]));
        assert_eq!(axes.get(AxisId::X).domain(), (100.0, 200.0));

        let data = groups(&[1.0, 2.0, 3.0]);
        axes.set_x_domain(None, Some(&data));
        assert!(!axes.get(AxisId::X).is_user_defined());
        assert_eq!(axes.get(AxisId::X).domain(), (0.0, 2.0));
    }

    #[test]
    fn empty_side_is_hidden() {
        let mut axes = AxisSet::new();
        axes.apply_groups(Pane::Main, &groups(&[3.0, 7.0]));
        assert!(axes.get(AxisId::Left).is_visible());
        assert!(!axes.get(AxisId::Right).is_visible());
    }
}
