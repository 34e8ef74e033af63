use tracing::{debug, trace};

use crate::core::{
    AxisId, AxisSide, DataBucket, MetricConfig, SeriesGroups, SeriesModel, TimeRange, Viewport,
};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{BrushController, HoverState};
use crate::render::{Pane, ReconcileStats, RegionId, Renderer, Surface};

#[cfg(feature = "cairo-backend")]
use crate::render::CairoContextRenderer;

use super::axes::{AxisScaleType, AxisSet};
use super::color_scale::OrdinalColorScale;
use super::layout::{ChartDimensions, MAIN_HEIGHT_PX};
use super::legend::{LegendRow, LegendSources, build_legend_rows};
use super::render_pass;

/// Dual-axis time-series chart with a brushable preview pane.
///
/// Setters mutate chart state and return `&mut Self` for chaining; nothing
/// is drawn until [`TimeSeriesChart::render`]. Every region of the retained
/// [`Surface`] is reconciled by key on each pass, so rendering unchanged
/// state is a no-op on the scene.
pub struct TimeSeriesChart<R: Renderer> {
    renderer: R,
    surface: Surface,
    model: SeriesModel,
    axes: AxisSet,
    colors: OrdinalColorScale,
    brush: BrushController,
    hover: HoverState,
    main: Option<SeriesGroups>,
    preview: Option<SeriesGroups>,
    legend: Vec<LegendRow>,
    loading_text: Option<String>,
    width: u32,
    viewport: Viewport,
    last_stats: ReconcileStats,
}

impl<R: Renderer> TimeSeriesChart<R> {
    pub fn new(renderer: R, metrics: &[MetricConfig], width: u32) -> ChartResult<Self> {
        if width == 0 {
            return Err(ChartError::InvalidViewport {
                width,
                height: MAIN_HEIGHT_PX as u32,
            });
        }
        let dims = ChartDimensions::for_width(width, false);
        Ok(Self {
            renderer,
            surface: Surface::new(),
            model: SeriesModel::new(metrics),
            axes: AxisSet::new(),
            colors: OrdinalColorScale::default(),
            brush: BrushController::new(),
            hover: HoverState::default(),
            main: None,
            preview: None,
            legend: Vec::new(),
            loading_text: None,
            width,
            viewport: dims.viewport(0),
            last_stats: ReconcileStats::default(),
        })
    }

    /// Binds the zoomed bucket.
    ///
    /// A bucket made only of entries for metrics no longer on the chart is
    /// ignored and the previous series stay bound.
    pub fn set_main_data(&mut self, bucket: &DataBucket) -> &mut Self {
        if let Some(groups) = self.bind(Pane::Main, bucket) {
            self.main = Some(groups);
        }
        self
    }

    /// Binds the full-range bucket shown in the preview pane.
    pub fn set_preview_data(&mut self, bucket: &DataBucket) -> &mut Self {
        if let Some(groups) = self.bind(Pane::Preview, bucket) {
            self.preview = Some(groups);
        }
        self
    }

    fn bind(&mut self, pane: Pane, bucket: &DataBucket) -> Option<SeriesGroups> {
        let Some(groups) = self.model.bind(bucket) else {
            debug!(?pane, entries = bucket.len(), "bucket holds only stale entries");
            return None;
        };
        self.axes.apply_groups(pane, &groups);
        debug!(
            ?pane,
            left = groups.left.len(),
            right = groups.right.len(),
            "series bound"
        );
        Some(groups)
    }

    /// Replaces the metric set used to recognize bucket entries.
    pub fn set_metrics(&mut self, metrics: &[MetricConfig]) -> &mut Self {
        self.model = SeriesModel::new(metrics);
        self
    }

    pub fn set_axis_scale(&mut self, side: AxisSide, scale_type: AxisScaleType) -> &mut Self {
        if self.axes.scale_type(side) != scale_type {
            self.axes.set_axis_type(side, scale_type);
        }
        self
    }

    pub fn set_left_scale(&mut self, scale_type: AxisScaleType) -> &mut Self {
        self.set_axis_scale(AxisSide::Left, scale_type)
    }

    pub fn set_right_scale(&mut self, scale_type: AxisScaleType) -> &mut Self {
        self.set_axis_scale(AxisSide::Right, scale_type)
    }

    /// String form of [`TimeSeriesChart::set_axis_scale`]; anything other
    /// than `linear` or `log` is rejected.
    pub fn set_axis_scale_str(&mut self, side: AxisSide, scale_type: &str) -> ChartResult<&mut Self> {
        let scale_type = scale_type.parse()?;
        Ok(self.set_axis_scale(side, scale_type))
    }

    #[must_use]
    pub fn axis_scale(&self, side: AxisSide) -> AxisScaleType {
        self.axes.scale_type(side)
    }

    /// Pins the main x domain; `None` returns it to tracking the bound data.
    pub fn set_x_domain(&mut self, range: Option<TimeRange>) -> &mut Self {
        self.axes.set_x_domain(range, self.main.as_ref());
        self
    }

    pub fn set_x_preview_domain(&mut self, range: Option<TimeRange>) -> &mut Self {
        self.axes.set_x_preview_domain(range, self.preview.as_ref());
        self
    }

    #[must_use]
    pub fn x_domain(&self) -> (f64, f64) {
        self.axes.get(AxisId::X).domain()
    }

    #[must_use]
    pub fn x_preview_domain(&self) -> (f64, f64) {
        self.axes.get(AxisId::XPreview).domain()
    }

    /// Called on every brush drag step.
    pub fn on_brush(&mut self, callback: impl FnMut(Option<TimeRange>) + 'static) -> &mut Self {
        self.brush.set_on_change(Box::new(callback));
        self
    }

    /// Called when a brush gesture is released.
    pub fn on_brush_end(
        &mut self,
        callback: impl FnMut(Option<TimeRange>) + 'static,
    ) -> &mut Self {
        self.brush.set_on_commit(Box::new(callback));
        self
    }

    pub fn set_loading_text(&mut self, text: Option<String>) -> &mut Self {
        self.loading_text = text;
        self
    }

    #[must_use]
    pub fn loading_text(&self) -> Option<&str> {
        self.loading_text.as_deref()
    }

    /// Drops the brush selection without notifying the brush callbacks.
    pub fn clear_brush(&mut self) -> &mut Self {
        self.brush.clear();
        self
    }

    pub fn set_width(&mut self, width: u32) -> ChartResult<&mut Self> {
        if width == 0 {
            return Err(ChartError::InvalidViewport {
                width,
                height: self.viewport.height,
            });
        }
        self.width = width;
        Ok(self)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    fn dimensions(&self) -> ChartDimensions {
        ChartDimensions::for_width(self.width, self.preview.is_some())
    }

    /// Reconciles every region against current state and presents the frame.
    pub fn render(&mut self) -> ChartResult<&mut Self> {
        let dims = self.dimensions();
        self.axes.set_ranges(&dims);
        self.colors.reset();

        let mut stats = self.render_main(&dims);
        stats += self.render_preview(&dims);
        stats += self.render_legend(&dims);
        stats += self.render_loading(&dims);

        self.viewport = dims.viewport(self.legend.len());
        self.last_stats = stats;
        debug!(
            nodes = self.surface.node_count(),
            entered = stats.entered,
            updated = stats.updated,
            exited = stats.exited,
            "chart rendered"
        );
        self.present()?;
        Ok(self)
    }

    fn render_main(&mut self, dims: &ChartDimensions) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        let x_scale = self.axes.scale(AxisId::X);

        for side in [AxisSide::Left, AxisSide::Right] {
            let y_axis = *self.axes.get(AxisId::y(side, false));
            let series = self.main.as_ref().map_or(&[][..], |groups| groups.side(side));
            let lines =
                render_pass::line_nodes(series, x_scale, y_axis.scale(), &mut self.colors);
            stats += self.surface.reconcile(
                RegionId::Lines {
                    pane: Pane::Main,
                    side,
                },
                lines,
            );

            let axis = if !series.is_empty() && y_axis.is_visible() {
                render_pass::y_axis_node(side, y_axis.scale(), dims.main)
            } else {
                Vec::new()
            };
            stats += self
                .surface
                .reconcile(RegionId::Axis(AxisId::y(side, false)), axis);
        }

        stats += self.surface.reconcile(
            RegionId::Axis(AxisId::X),
            render_pass::x_axis_node(x_scale, dims.main),
        );
        stats += self
            .surface
            .reconcile(RegionId::Overlay, render_pass::overlay_node(dims.overlay));
        stats
    }

    fn render_preview(&mut self, dims: &ChartDimensions) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        let Some(groups) = self.preview.as_ref() else {
            for side in [AxisSide::Left, AxisSide::Right] {
                stats += self.surface.remove_region(RegionId::Lines {
                    pane: Pane::Preview,
                    side,
                });
            }
            stats += self.surface.remove_region(RegionId::Axis(AxisId::XPreview));
            stats += self.surface.remove_region(RegionId::Brush);
            return stats;
        };

        let x_scale = self.axes.scale(AxisId::XPreview);
        for side in [AxisSide::Left, AxisSide::Right] {
            let lines = render_pass::line_nodes(
                groups.side(side),
                x_scale,
                self.axes.scale(AxisId::y(side, true)),
                &mut self.colors,
            );
            stats += self.surface.reconcile(
                RegionId::Lines {
                    pane: Pane::Preview,
                    side,
                },
                lines,
            );
        }
        stats += self.surface.reconcile(
            RegionId::Axis(AxisId::XPreview),
            render_pass::x_axis_node(x_scale, dims.preview),
        );

        self.brush.set_extent(dims.preview.left, dims.preview.right);
        let main_domain = self.x_domain();
        if main_domain != self.x_preview_domain() {
            let selection = x_scale
                .map(main_domain.0)
                .zip(x_scale.map(main_domain.1));
            trace!(?selection, "brush follows main domain");
            self.brush.move_to(selection);
        }
        stats += self.surface.reconcile(
            RegionId::Brush,
            render_pass::brush_nodes(&self.brush, dims.brush_band),
        );
        stats
    }

    fn render_legend(&mut self, dims: &ChartDimensions) -> ReconcileStats {
        let sources = LegendSources {
            main: self.main.as_ref(),
            preview: self.preview.as_ref(),
        };
        self.legend = build_legend_rows(self.colors.entries(), sources, &self.hover);
        let nodes = if self.legend.is_empty() {
            Vec::new()
        } else {
            render_pass::legend_nodes(&self.legend, sources.has_both_axes(), dims)
        };
        self.surface.reconcile(RegionId::Legend, nodes)
    }

    fn render_loading(&mut self, dims: &ChartDimensions) -> ReconcileStats {
        let nodes = self
            .loading_text
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| render_pass::loading_node(text, dims.main))
            .unwrap_or_default();
        self.surface.reconcile(RegionId::LoadingText, nodes)
    }

    fn present(&mut self) -> ChartResult<()> {
        let frame = self.surface.to_frame(self.viewport);
        self.renderer.render(&frame)
    }

    /// Tracks the pointer over the main chart.
    ///
    /// Positions outside the pointer-tracking area behave like
    /// [`TimeSeriesChart::pointer_out`].
    pub fn pointer_move(&mut self, x: f64, y: f64) -> ChartResult<&mut Self> {
        let dims = self.dimensions();
        if !dims.overlay.contains(x, y) {
            return self.pointer_out();
        }
        self.axes.set_ranges(&dims);

        let empty = SeriesGroups::default();
        let groups = self.main.as_ref().unwrap_or(&empty);
        self.hover.track(x, groups, self.axes.scale(AxisId::X));
        trace!(x, hits = self.hover.values().count(), "hover tracked");

        self.surface
            .reconcile(RegionId::Indicator, render_pass::indicator_node(x));
        self.render_legend(&dims);
        self.present()?;
        Ok(self)
    }

    /// Clears hovered values and the indicator line.
    pub fn pointer_out(&mut self) -> ChartResult<&mut Self> {
        if !self.hover.is_active() && !self.surface.has_region(RegionId::Indicator) {
            return Ok(self);
        }
        let dims = self.dimensions();
        self.hover.clear();
        self.surface.remove_region(RegionId::Indicator);
        self.render_legend(&dims);
        self.present()?;
        Ok(self)
    }

    /// Starts a brush gesture at preview-pane pixel `x`.
    pub fn brush_start(&mut self, x: f64) -> &mut Self {
        if self.preview.is_some() {
            self.brush.pointer_down(x);
        }
        self
    }

    pub fn brush_drag(&mut self, x: f64) -> ChartResult<&mut Self> {
        if !self.brush.is_active() {
            return Ok(self);
        }
        self.brush.pointer_move(x, self.axes.scale(AxisId::XPreview));
        self.redraw_brush()
    }

    pub fn brush_end(&mut self, x: f64) -> ChartResult<&mut Self> {
        if !self.brush.is_active() {
            return Ok(self);
        }
        self.brush.pointer_up(x, self.axes.scale(AxisId::XPreview));
        self.redraw_brush()
    }

    fn redraw_brush(&mut self) -> ChartResult<&mut Self> {
        let dims = self.dimensions();
        self.surface.reconcile(
            RegionId::Brush,
            render_pass::brush_nodes(&self.brush, dims.brush_band),
        );
        self.present()?;
        Ok(self)
    }

    /// Brush selection in time, converted through the preview x scale.
    #[must_use]
    pub fn brush_selection(&self) -> Option<TimeRange> {
        self.brush
            .selection_range(self.axes.scale(AxisId::XPreview))
    }

    #[must_use]
    pub fn brush(&self) -> &BrushController {
        &self.brush
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[must_use]
    pub fn axes(&self) -> &AxisSet {
        &self.axes
    }

    #[must_use]
    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    #[must_use]
    pub fn legend_rows(&self) -> &[LegendRow] {
        &self.legend
    }

    #[must_use]
    pub fn main_groups(&self) -> Option<&SeriesGroups> {
        self.main.as_ref()
    }

    #[must_use]
    pub fn preview_groups(&self) -> Option<&SeriesGroups> {
        self.preview.as_ref()
    }

    #[must_use]
    pub fn colors(&self) -> &OrdinalColorScale {
        &self.colors
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn last_render_stats(&self) -> ReconcileStats {
        self.last_stats
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Draws the retained scene into an external cairo context.
    ///
    /// Used by GTK draw callbacks; the scene is not reconciled again.
    #[cfg(feature = "cairo-backend")]
    pub fn render_on_cairo_context(&mut self, context: &cairo::Context) -> ChartResult<()>
    where
        R: CairoContextRenderer,
    {
        let frame = self.surface.to_frame(self.viewport);
        self.renderer.render_on_cairo_context(context, &frame)
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
