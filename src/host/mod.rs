//! Chart host: mount/update/unmount lifecycle around a [`TimeSeriesChart`].
//!
//! The host owns the two debounced operations (resize re-render and
//! selection notification) as [`PendingOperation`] values and fires them from
//! [`ChartHost::poll_timers`], which the embedding event loop calls whenever
//! [`ChartHost::next_deadline`] has passed.

mod clock;
mod config;
mod events;
mod pending;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ChartConfig, ChartProps, HostTuning, LOADING_TEXT};
pub use events::{ResizeEvent, Subscription, WindowEvents};
pub use pending::PendingOperation;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::api::TimeSeriesChart;
use crate::core::TimeRange;
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

/// Receives `(chart_index, range)` once a brush selection has settled.
pub type SelectionCallback = Box<dyn FnMut(usize, Option<TimeRange>)>;

type SharedPending<T> = Rc<RefCell<PendingOperation<T>>>;

/// Prop updates run synchronously inside `update`, so a host is never
/// observed between mount and unmount in any state other than `Mounted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostLifecycle {
    Unmounted,
    Mounted,
}

/// Environment a host is mounted into.
#[derive(Clone)]
pub struct HostMount {
    pub chart_index: usize,
    pub width: u32,
    pub events: WindowEvents,
    pub clock: Rc<dyn Clock>,
    pub tuning: HostTuning,
}

impl HostMount {
    /// Mount point using the system clock and default debounce delays.
    #[must_use]
    pub fn new(chart_index: usize, width: u32, events: WindowEvents) -> Self {
        Self {
            chart_index,
            width,
            events,
            clock: Rc::new(SystemClock::new()),
            tuning: HostTuning::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_tuning(mut self, tuning: HostTuning) -> Self {
        self.tuning = tuning;
        self
    }
}

/// What a [`ChartHost::poll_timers`] call fired.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimerFirings {
    pub selection_notified: bool,
    pub selection: Option<TimeRange>,
    pub rendered: bool,
}

impl TimerFirings {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.selection_notified && !self.rendered
    }
}

pub struct ChartHost<R: Renderer> {
    chart: Option<TimeSeriesChart<R>>,
    props: ChartProps,
    chart_index: usize,
    lifecycle: HostLifecycle,
    clock: Rc<dyn Clock>,
    tuning: HostTuning,
    selection: SharedPending<Option<TimeRange>>,
    resize: SharedPending<u32>,
    on_selection: SelectionCallback,
    resize_subscription: Option<Subscription>,
}

impl<R: Renderer> ChartHost<R> {
    /// Builds the chart, binds the initial buckets and renders once.
    pub fn mount(
        renderer: R,
        props: ChartProps,
        mount: HostMount,
        on_selection: impl FnMut(usize, Option<TimeRange>) + 'static,
    ) -> ChartResult<Self> {
        props.config.validate()?;
        let selection: SharedPending<Option<TimeRange>> = Rc::default();
        let resize: SharedPending<u32> = Rc::default();

        let chart = build_chart(
            renderer,
            &props,
            mount.width,
            &mount.clock,
            mount.tuning.selection_debounce,
            &selection,
        )?;

        let resize_subscription = {
            let pending = Rc::clone(&resize);
            let clock = Rc::clone(&mount.clock);
            let delay = mount.tuning.resize_debounce;
            mount.events.subscribe_resize(move |event| {
                let deadline = clock.now() + delay;
                if pending.borrow_mut().schedule(deadline, event.width).is_some() {
                    trace!(width = event.width, "resize debounce restarted");
                }
            })
        };

        let mut host = Self {
            chart: Some(chart),
            props,
            chart_index: mount.chart_index,
            lifecycle: HostLifecycle::Mounted,
            clock: mount.clock,
            tuning: mount.tuning,
            selection,
            resize,
            on_selection: Box::new(on_selection),
            resize_subscription: Some(resize_subscription),
        };
        host.render()?;
        debug!(chart_index = host.chart_index, width = mount.width, "chart host mounted");
        Ok(host)
    }

    /// Diffs `props` against the previous props by `Rc` identity and applies
    /// only what changed, then renders.
    pub fn update(&mut self, props: ChartProps) -> ChartResult<()> {
        self.ensure_mounted()?;
        if !Rc::ptr_eq(&self.props.config, &props.config) {
            props.config.validate()?;
        }
        let previous = std::mem::replace(&mut self.props, props);
        self.apply_update(&previous)
    }

    fn apply_update(&mut self, previous: &ChartProps) -> ChartResult<()> {
        let config = Rc::clone(&self.props.config);
        if !Rc::ptr_eq(&previous.config, &config) && previous.config.metrics != config.metrics {
            return self.rebuild();
        }

        let chart = self.chart.as_mut().ok_or(ChartError::NotMounted)?;
        let preview_data = &self.props.preview_data;
        if !Rc::ptr_eq(&previous.preview_data, preview_data) && !preview_data.is_loading() {
            debug!(chart_index = self.chart_index, "preview bucket replaced");
            chart
                .set_x_preview_domain(Some(config.preview_range()?))
                .set_preview_data(preview_data);
        }

        let data = &self.props.data;
        if !Rc::ptr_eq(&previous.data, data) && !data.is_loading() {
            debug!(chart_index = self.chart_index, "data bucket replaced");
            let range = match config.selection {
                Some(selection) => selection,
                None => {
                    chart.clear_brush();
                    config.preview_range()?
                }
            };
            chart.set_x_domain(Some(range)).set_main_data(data);
        }

        chart.set_loading_text(loading_text(&config));
        self.render()
    }

    /// Replaces the chart after the metric set changed, keeping the renderer.
    fn rebuild(&mut self) -> ChartResult<()> {
        let chart = self.chart.take().ok_or(ChartError::NotMounted)?;
        let width = chart.width();
        self.selection.borrow_mut().cancel();
        let chart = build_chart(
            chart.into_renderer(),
            &self.props,
            width,
            &self.clock,
            self.tuning.selection_debounce,
            &self.selection,
        )?;
        self.chart = Some(chart);
        debug!(chart_index = self.chart_index, "chart rebuilt for new metrics");
        self.render()
    }

    /// Applies the configured axis scale types and renders.
    pub fn render(&mut self) -> ChartResult<()> {
        let config = Rc::clone(&self.props.config);
        let chart = self.chart.as_mut().ok_or(ChartError::NotMounted)?;
        chart
            .set_left_scale(config.left_axis)
            .set_right_scale(config.right_axis)
            .render()?;
        Ok(())
    }

    /// Fires every debounced operation whose deadline has passed.
    pub fn poll_timers(&mut self) -> ChartResult<TimerFirings> {
        self.ensure_mounted()?;
        let now = self.clock.now();
        let mut firings = TimerFirings::default();

        let due_selection = self.selection.borrow_mut().take_due(now);
        if let Some(range) = due_selection {
            debug!(chart_index = self.chart_index, ?range, "selection settled");
            (self.on_selection)(self.chart_index, range);
            firings.selection_notified = true;
            firings.selection = range;
        }

        let due_width = self.resize.borrow_mut().take_due(now);
        if let Some(width) = due_width {
            if width == 0 {
                warn!(chart_index = self.chart_index, "ignoring resize to zero width");
            } else {
                let chart = self.chart.as_mut().ok_or(ChartError::NotMounted)?;
                chart.set_width(width)?;
                self.render()?;
                firings.rendered = true;
            }
        }
        Ok(firings)
    }

    /// Earliest pending timer deadline, on the host clock.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        let selection = self.selection.borrow().deadline();
        let resize = self.resize.borrow().deadline();
        match (selection, resize) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    #[must_use]
    pub fn is_selection_pending(&self) -> bool {
        self.selection.borrow().is_pending()
    }

    #[must_use]
    pub fn is_render_pending(&self) -> bool {
        self.resize.borrow().is_pending()
    }

    /// `(series name, message)` for every errored entry of the current
    /// buckets; the data bucket wins when both report the same series.
    #[must_use]
    pub fn errors(&self) -> Vec<(String, String)> {
        let mut errors: IndexMap<String, String> = IndexMap::new();
        for (name, message) in self
            .props
            .preview_data
            .errors()
            .into_iter()
            .chain(self.props.data.errors())
        {
            errors.insert(name, message);
        }
        errors.into_iter().collect()
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> ChartResult<()> {
        self.chart_mut()?.pointer_move(x, y)?;
        Ok(())
    }

    pub fn pointer_out(&mut self) -> ChartResult<()> {
        self.chart_mut()?.pointer_out()?;
        Ok(())
    }

    pub fn brush_start(&mut self, x: f64) -> ChartResult<()> {
        self.chart_mut()?.brush_start(x);
        Ok(())
    }

    pub fn brush_drag(&mut self, x: f64) -> ChartResult<()> {
        self.chart_mut()?.brush_drag(x)?;
        Ok(())
    }

    pub fn brush_end(&mut self, x: f64) -> ChartResult<()> {
        self.chart_mut()?.brush_end(x)?;
        Ok(())
    }

    #[must_use]
    pub fn chart(&self) -> Option<&TimeSeriesChart<R>> {
        self.chart.as_ref()
    }

    pub fn chart_mut(&mut self) -> ChartResult<&mut TimeSeriesChart<R>> {
        self.ensure_mounted()?;
        self.chart.as_mut().ok_or(ChartError::NotMounted)
    }

    #[must_use]
    pub fn props(&self) -> &ChartProps {
        &self.props
    }

    #[must_use]
    pub fn chart_index(&self) -> usize {
        self.chart_index
    }

    #[must_use]
    pub fn lifecycle(&self) -> HostLifecycle {
        self.lifecycle
    }

    /// Cancels pending timers, drops the resize listener and hands back the
    /// renderer.
    pub fn unmount(mut self) -> Option<R> {
        self.teardown();
        self.chart.take().map(TimeSeriesChart::into_renderer)
    }

    fn teardown(&mut self) {
        if self.lifecycle == HostLifecycle::Unmounted {
            return;
        }
        self.selection.borrow_mut().cancel();
        self.resize.borrow_mut().cancel();
        self.resize_subscription = None;
        self.lifecycle = HostLifecycle::Unmounted;
        debug!(chart_index = self.chart_index, "chart host unmounted");
    }

    fn ensure_mounted(&self) -> ChartResult<()> {
        match self.lifecycle {
            HostLifecycle::Unmounted => Err(ChartError::NotMounted),
            HostLifecycle::Mounted => Ok(()),
        }
    }
}

impl<R: Renderer> Drop for ChartHost<R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn loading_text(config: &ChartConfig) -> Option<String> {
    config.initial_load.then(|| LOADING_TEXT.to_owned())
}

/// Creates a chart for `props` with the brush wired to the selection timer.
fn build_chart<R: Renderer>(
    renderer: R,
    props: &ChartProps,
    width: u32,
    clock: &Rc<dyn Clock>,
    selection_debounce: Duration,
    selection: &SharedPending<Option<TimeRange>>,
) -> ChartResult<TimeSeriesChart<R>> {
    let config = &props.config;
    let mut chart = TimeSeriesChart::new(renderer, &config.metrics, width)?;

    let pending = Rc::clone(selection);
    chart.on_brush(move |_| {
        pending.borrow_mut().cancel();
    });

    let pending = Rc::clone(selection);
    let clock = Rc::clone(clock);
    chart.on_brush_end(move |range| {
        let deadline = clock.now() + selection_debounce;
        if pending.borrow_mut().schedule(deadline, range).is_some() {
            trace!(?range, "selection debounce restarted");
        }
    });

    chart
        .set_x_domain(Some(config.data_range()?))
        .set_x_preview_domain(Some(config.preview_range()?));
    if !props.preview_data.is_loading() {
        chart.set_preview_data(&props.preview_data);
    }
    if !props.data.is_loading() {
        chart.set_main_data(&props.data);
    }
    chart.set_loading_text(loading_text(config));
    Ok(chart)
}

/// Host shared between event-loop callbacks.
///
/// Every entry goes through [`SharedChartHost::with`]; a callback that tries
/// to re-enter the host while it is already borrowed (for instance from the
/// selection callback during `poll_timers`) gets
/// [`ChartError::ReentrantRender`] instead of a nested render pass.
pub struct SharedChartHost<R: Renderer> {
    inner: Rc<RefCell<ChartHost<R>>>,
}

impl<R: Renderer> Clone for SharedChartHost<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: Renderer> SharedChartHost<R> {
    #[must_use]
    pub fn new(host: ChartHost<R>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(host)),
        }
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut ChartHost<R>) -> ChartResult<T>) -> ChartResult<T> {
        let mut host = self
            .inner
            .try_borrow_mut()
            .map_err(|_| ChartError::ReentrantRender)?;
        f(&mut host)
    }

    /// Unmounts the host if this is the last handle.
    pub fn unmount(self) -> Option<R> {
        Rc::try_unwrap(self.inner)
            .ok()
            .and_then(|host| host.into_inner().unmount())
    }
}
