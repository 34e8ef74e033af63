//! GTK4 embedding: a `DrawingArea` driving a [`SharedChartHost`].

use std::time::Duration;

use gtk4 as gtk;
use gtk::glib;
use gtk::prelude::*;
use tracing::warn;

use crate::api::ChartDimensions;
use crate::error::{ChartError, ChartResult};
use crate::host::{ChartHost, ResizeEvent, SharedChartHost, WindowEvents};
use crate::render::{CairoContextRenderer, Renderer};

const TIMER_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct GtkChartAdapter<R: Renderer + CairoContextRenderer + 'static> {
    host: SharedChartHost<R>,
    drawing_area: gtk::DrawingArea,
    timer: Option<glib::SourceId>,
}

impl<R: Renderer + CairoContextRenderer + 'static> GtkChartAdapter<R> {
    /// Wires drawing, pointer hover, brush dragging, resize and timer polling
    /// of `host` to a new drawing area. Resizes are published on `events` so
    /// the host debounces them like any other window resize.
    #[must_use]
    pub fn new(host: SharedChartHost<R>, events: WindowEvents) -> Self {
        let drawing_area = gtk::DrawingArea::new();
        drawing_area.set_hexpand(true);
        sync_content_size(&drawing_area, &host);

        {
            let host = host.clone();
            drawing_area.set_draw_func(move |_, context, _, _| {
                let result = host.with(|host| host.chart_mut()?.render_on_cairo_context(context));
                report("draw", result);
            });
        }

        let motion = gtk::EventControllerMotion::new();
        {
            let host = host.clone();
            let area = drawing_area.downgrade();
            motion.connect_motion(move |_, x, y| {
                report("pointer move", host.with(|host| host.pointer_move(x, y)));
                redraw(&area);
            });
        }
        {
            let host = host.clone();
            let area = drawing_area.downgrade();
            motion.connect_leave(move |_| {
                report("pointer out", host.with(ChartHost::pointer_out));
                redraw(&area);
            });
        }
        drawing_area.add_controller(motion);

        let drag = gtk::GestureDrag::new();
        {
            let host = host.clone();
            drag.connect_drag_begin(move |_, x, y| {
                let result = host.with(|host| {
                    if in_brush_band(host, y) {
                        host.brush_start(x)?;
                    }
                    Ok(())
                });
                report("brush start", result);
            });
        }
        {
            let host = host.clone();
            let area = drawing_area.downgrade();
            drag.connect_drag_update(move |gesture, dx, _| {
                if let Some((start_x, _)) = gesture.start_point() {
                    report("brush drag", host.with(|host| host.brush_drag(start_x + dx)));
                    redraw(&area);
                }
            });
        }
        {
            let host = host.clone();
            let area = drawing_area.downgrade();
            drag.connect_drag_end(move |gesture, dx, _| {
                if let Some((start_x, _)) = gesture.start_point() {
                    report("brush end", host.with(|host| host.brush_end(start_x + dx)));
                    redraw(&area);
                }
            });
        }
        drawing_area.add_controller(drag);

        drawing_area.connect_resize(move |_, width, height| {
            events.emit_resize(ResizeEvent {
                width: u32::try_from(width).unwrap_or(0),
                height: u32::try_from(height).unwrap_or(0),
            });
        });

        let timer = {
            let host = host.clone();
            let area = drawing_area.downgrade();
            glib::timeout_add_local(TIMER_POLL_INTERVAL, move || {
                match host.with(ChartHost::poll_timers) {
                    Ok(firings) if firings.rendered => {
                        if let Some(area) = area.upgrade() {
                            sync_content_size(&area, &host);
                            area.queue_draw();
                        }
                    }
                    Ok(_) | Err(ChartError::ReentrantRender) => {}
                    Err(err) => warn!(error = %err, "chart timers failed"),
                }
                glib::ControlFlow::Continue
            })
        };

        Self {
            host,
            drawing_area,
            timer: Some(timer),
        }
    }

    #[must_use]
    pub fn drawing_area(&self) -> &gtk::DrawingArea {
        &self.drawing_area
    }

    #[must_use]
    pub fn host(&self) -> &SharedChartHost<R> {
        &self.host
    }
}

impl<R: Renderer + CairoContextRenderer + 'static> Drop for GtkChartAdapter<R> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.remove();
        }
    }
}

fn in_brush_band<R: Renderer>(host: &ChartHost<R>, y: f64) -> bool {
    host.chart().is_some_and(|chart| {
        let (top, bottom) = ChartDimensions::for_width(chart.width(), true).brush_band;
        chart.preview_groups().is_some() && y >= top && y <= bottom
    })
}

fn sync_content_size<R: Renderer>(area: &gtk::DrawingArea, host: &SharedChartHost<R>) {
    let viewport = host.with(|host| {
        host.chart()
            .map(|chart| chart.viewport())
            .ok_or(ChartError::NotMounted)
    });
    if let Ok(viewport) = viewport {
        area.set_content_height(i32::try_from(viewport.height).unwrap_or(i32::MAX));
    }
}

fn redraw(area: &glib::WeakRef<gtk::DrawingArea>) {
    if let Some(area) = area.upgrade() {
        area.queue_draw();
    }
}

fn report(action: &str, result: ChartResult<()>) {
    match result {
        Ok(()) | Err(ChartError::ReentrantRender) => {}
        Err(err) => warn!(action, error = %err, "chart input failed"),
    }
}
