use smallvec::SmallVec;

use crate::core::{AxisSide, ContinuousScale, Series, project_path_runs};
use crate::interaction::BrushController;
use crate::render::{
    AXIS_COLOR, AxisOrientation, Color, LegendCell, LinePrimitive, NodeContent, RectPrimitive,
    TextHAlign, TextPrimitive,
};

use super::axis_ticks::{time_axis_ticks, value_axis_ticks};
use super::color_scale::OrdinalColorScale;
use super::layout::{ChartDimensions, MAIN_HEIGHT_PX, MAIN_TOP_PADDING_PX, PlotArea};
use super::legend::{LegendColumn, LegendRow, column_offsets, legend_columns};

pub(super) const LINE_STROKE_WIDTH_PX: f64 = 1.5;
pub(super) const LOADING_FONT_SIZE_PX: f64 = 14.0;
const INDICATOR_COLOR: Color = Color::rgba(0.4, 0.4, 0.4, 0.8);
const BRUSH_FILL: Color = Color::rgba(0.467, 0.467, 0.467, 0.3);
const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

pub(super) type DesiredNodes = Vec<(String, NodeContent)>;

/// One path per series, keyed by series name.
///
/// Colors are bound in call order, so callers must walk panes and sides in
/// the same order on every pass.
pub(super) fn line_nodes(
    series: &[Series],
    x_scale: ContinuousScale,
    y_scale: ContinuousScale,
    colors: &mut OrdinalColorScale,
) -> DesiredNodes {
    series
        .iter()
        .map(|series| {
            let content = NodeContent::Path {
                runs: project_path_runs(&series.rows, x_scale, y_scale),
                color: colors.color(&series.name),
                stroke_width: LINE_STROKE_WIDTH_PX,
            };
            (series.name.clone(), content)
        })
        .collect()
}

pub(super) fn y_axis_node(side: AxisSide, scale: ContinuousScale, area: PlotArea) -> DesiredNodes {
    let (orientation, offset) = match side {
        AxisSide::Left => (AxisOrientation::Left, area.left),
        AxisSide::Right => (AxisOrientation::Right, area.right),
    };
    vec![(
        "axis".to_owned(),
        NodeContent::Axis {
            orientation,
            offset,
            span: (area.bottom, area.top),
            ticks: value_axis_ticks(scale),
        },
    )]
}

pub(super) fn x_axis_node(scale: ContinuousScale, area: PlotArea) -> DesiredNodes {
    vec![(
        "axis".to_owned(),
        NodeContent::Axis {
            orientation: AxisOrientation::Bottom,
            offset: area.bottom,
            span: (area.left, area.right),
            ticks: time_axis_ticks(scale),
        },
    )]
}

/// Invisible rect marking the pointer-tracking area.
pub(super) fn overlay_node(area: PlotArea) -> DesiredNodes {
    vec![(
        "overlay".to_owned(),
        NodeContent::Rect(RectPrimitive::new(
            area.left,
            area.top,
            area.width(),
            area.height(),
            TRANSPARENT,
        )),
    )]
}

pub(super) fn indicator_node(x: f64) -> DesiredNodes {
    vec![(
        "indicator".to_owned(),
        NodeContent::Line(LinePrimitive::new(
            x,
            MAIN_TOP_PADDING_PX,
            x,
            MAIN_HEIGHT_PX,
            1.0,
            INDICATOR_COLOR,
        )),
    )]
}

/// Extent rect plus the selection rect when one exists.
pub(super) fn brush_nodes(brush: &BrushController, band: (f64, f64)) -> DesiredNodes {
    let (left, right) = brush.extent();
    let height = band.1 - band.0;
    let mut nodes = vec![(
        "extent".to_owned(),
        NodeContent::Rect(RectPrimitive::new(left, band.0, right - left, height, TRANSPARENT)),
    )];
    if let Some((x0, x1)) = brush.selection_px() {
        nodes.push((
            "selection".to_owned(),
            NodeContent::Rect(
                RectPrimitive::new(x0, band.0, x1 - x0, height, BRUSH_FILL)
                    .with_border(1.0, Color::rgb(1.0, 1.0, 1.0)),
            ),
        ));
    }
    nodes
}

/// Header plus one row per series, keyed by series name.
pub(super) fn legend_nodes(rows: &[LegendRow], show_axis: bool, dims: &ChartDimensions) -> DesiredNodes {
    let columns = legend_columns(show_axis);
    let offsets = column_offsets(&columns);

    let header_cells = columns
        .iter()
        .zip(offsets.iter())
        .filter(|(column, _)| !column.title().is_empty())
        .map(|(column, x)| LegendCell {
            x: *x,
            text: column.title().to_owned(),
        })
        .collect();
    let mut nodes = Vec::with_capacity(rows.len() + 1);
    nodes.push((
        "header".to_owned(),
        NodeContent::LegendRow {
            swatch: None,
            y: dims.legend_line_y(0),
            cells: header_cells,
        },
    ));

    for (index, row) in rows.iter().enumerate() {
        let cells: SmallVec<[LegendCell; 8]> = columns
            .iter()
            .zip(offsets.iter())
            .filter(|(column, _)| **column != LegendColumn::Color)
            .map(|(column, x)| LegendCell {
                x: *x,
                text: row.cell(*column),
            })
            .collect();
        nodes.push((
            format!("row:{}", row.name),
            NodeContent::LegendRow {
                swatch: Some(row.color),
                y: dims.legend_line_y(index + 1),
                cells,
            },
        ));
    }
    nodes
}

pub(super) fn loading_node(text: &str, area: PlotArea) -> DesiredNodes {
    vec![(
        "loading".to_owned(),
        NodeContent::Text(TextPrimitive::new(
            text,
            (area.left + area.right) / 2.0,
            (area.top + area.bottom) / 2.0,
            LOADING_FONT_SIZE_PX,
            AXIS_COLOR,
            TextHAlign::Center,
        )),
    )]
}
