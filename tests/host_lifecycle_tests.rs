use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use chrono::{DateTime, Utc};
use metric_chart::api::AxisScaleType;
use metric_chart::core::{AxisId, AxisSide, BucketEntry, DataBucket, MetricConfig, Row, TimeRange};
use metric_chart::host::{
    ChartConfig, ChartHost, ChartProps, HostLifecycle, HostMount, LOADING_TEXT, ManualClock,
    ResizeEvent, SharedChartHost, WindowEvents,
};
use metric_chart::render::{NullRenderer, RegionId};
use metric_chart::ChartError;

const T0: i64 = 1_700_000_000;

type Notifications = Rc<RefCell<Vec<(usize, Option<TimeRange>)>>>;

fn at(offset_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(T0 + offset_secs, 0).expect("valid timestamp")
}

fn secs(offset: f64) -> f64 {
    T0 as f64 + offset
}

fn metrics() -> Vec<MetricConfig> {
    vec![
        MetricConfig::new("prod", "api", "latency", "p99").with_axis(AxisSide::Left),
        MetricConfig::new("prod", "api", "requests", "mean_rate").with_axis(AxisSide::Right),
    ]
}

fn full_bucket(metrics: &[MetricConfig]) -> DataBucket {
    metrics.iter().enumerate().fold(DataBucket::new(), |bucket, (index, metric)| {
        let rows = (0..100)
            .map(|i| Row::value(secs(3_600.0 * i as f64 / 99.0), (index * 100 + i) as f64))
            .collect();
        bucket.with_entry(metric.series_name(), BucketEntry::ready(rows))
    })
}

fn config() -> ChartConfig {
    ChartConfig::new(at(0), at(3_600)).with_metrics(metrics())
}

fn props() -> ChartProps {
    let bucket = full_bucket(&metrics());
    ChartProps::new(config())
        .with_preview_data(bucket.clone())
        .with_data(bucket)
}

struct Harness {
    clock: ManualClock,
    events: WindowEvents,
    notifications: Notifications,
    host: ChartHost<NullRenderer>,
}

fn mount(props: ChartProps) -> Harness {
    let clock = ManualClock::new();
    let events = WindowEvents::new();
    let notifications: Notifications = Rc::default();
    let sink = Rc::clone(&notifications);
    let mount = HostMount::new(3, 800, events.clone()).with_clock(Rc::new(clock.clone()));
    let host = ChartHost::mount(NullRenderer::default(), props, mount, move |index, range| {
        sink.borrow_mut().push((index, range));
    })
    .expect("mount");
    Harness {
        clock,
        events,
        notifications,
        host,
    }
}

fn drag(host: &mut ChartHost<NullRenderer>, from: f64, to: f64) {
    host.brush_start(from).expect("brush start");
    host.brush_drag((from + to) / 2.0).expect("brush drag");
    host.brush_end(to).expect("brush end");
}

#[test]
fn mount_binds_data_and_renders_once() {
    let harness = mount(props());
    let chart = harness.host.chart().expect("mounted chart");

    assert_eq!(harness.host.lifecycle(), HostLifecycle::Mounted);
    assert_eq!(harness.host.chart_index(), 3);
    assert_eq!(chart.renderer().frames_rendered, 1);
    assert!(chart.main_groups().is_some());
    assert!(chart.preview_groups().is_some());
    assert_eq!(chart.x_domain(), (secs(0.0), secs(3_600.0)));
    assert_eq!(chart.x_preview_domain(), (secs(0.0), secs(3_600.0)));
    assert_eq!(harness.events.listener_count(), 1);
    assert!(harness.host.next_deadline().is_none());
}

#[test]
fn mount_applies_configured_scales_and_loading_text() {
    let props = ChartProps::new(
        config()
            .with_right_axis(AxisScaleType::Log)
            .with_initial_load(true),
    );
    let harness = mount(props);
    let chart = harness.host.chart().expect("mounted chart");

    assert_eq!(chart.axis_scale(AxisSide::Right), AxisScaleType::Log);
    assert_eq!(chart.axis_scale(AxisSide::Left), AxisScaleType::Linear);
    assert_eq!(chart.loading_text(), Some(LOADING_TEXT));
    assert!(chart.surface().has_region(RegionId::LoadingText));
    assert!(chart.main_groups().is_some_and(|groups| groups.is_empty()));
}

#[test]
fn mount_rejects_invalid_configuration() {
    let props = ChartProps::new(ChartConfig::new(at(3_600), at(0)));
    let result = ChartHost::mount(
        NullRenderer::default(),
        props,
        HostMount::new(0, 800, WindowEvents::new()),
        |_, _| {},
    );
    assert!(matches!(result, Err(ChartError::InvalidData(_))));
}

#[test]
fn five_quick_commits_notify_once_with_the_last_range() {
    let mut harness = mount(props());
    let gestures = [(460.0, 700.0), (440.0, 690.0), (420.0, 680.0), (400.0, 670.0), (170.0, 285.0)];
    for (index, (from, to)) in gestures.into_iter().enumerate() {
        if index > 0 {
            harness.clock.advance(Duration::from_millis(100));
        }
        drag(&mut harness.host, from, to);
        assert!(harness.host.is_selection_pending());
        assert!(harness.host.poll_timers().expect("poll").is_empty());
    }

    harness.clock.advance(Duration::from_millis(599));
    assert!(harness.host.poll_timers().expect("poll").is_empty());
    assert!(harness.notifications.borrow().is_empty());

    harness.clock.advance(Duration::from_millis(1));
    let firings = harness.host.poll_timers().expect("poll");
    assert!(firings.selection_notified);
    assert!(!harness.host.is_selection_pending());

    let notifications = harness.notifications.borrow();
    assert_eq!(notifications.len(), 1);
    let (index, range) = notifications[0];
    assert_eq!(index, 3);
    let range = range.expect("selection range");
    assert_abs_diff_eq!(range.start, secs(600.0), epsilon = 1e-6);
    assert_abs_diff_eq!(range.end, secs(1_200.0), epsilon = 1e-6);
    assert_eq!(firings.selection, Some(range));
}

#[test]
fn dragging_again_cancels_a_pending_notification() {
    let mut harness = mount(props());
    drag(&mut harness.host, 170.0, 285.0);
    harness.clock.advance(Duration::from_millis(500));

    harness.host.brush_start(100.0).expect("brush start");
    harness.host.brush_drag(150.0).expect("brush drag");
    assert!(!harness.host.is_selection_pending());

    harness.clock.advance(Duration::from_secs(5));
    assert!(harness.host.poll_timers().expect("poll").is_empty());
    assert!(harness.notifications.borrow().is_empty());
}

#[test]
fn committed_selection_round_trips_through_props() {
    let mut harness = mount(props());
    drag(&mut harness.host, 170.0, 285.0);
    harness.clock.advance(Duration::from_millis(600));
    harness.host.poll_timers().expect("poll");
    let selection = harness.notifications.borrow()[0].1;

    // The dashboard stores the selection and refetches the zoomed data.
    let next = harness
        .host
        .props()
        .with_config(config().with_selection(selection))
        .with_data(full_bucket(&metrics()));
    harness.host.update(next).expect("update");

    let chart = harness.host.chart().expect("mounted chart");
    let (start, end) = chart.x_domain();
    assert_abs_diff_eq!(start, secs(600.0), epsilon = 1e-6);
    assert_abs_diff_eq!(end, secs(1_200.0), epsilon = 1e-6);
    let (x0, x1) = chart.brush().selection_px().expect("brush kept");
    assert_abs_diff_eq!(x0, 170.0, epsilon = 1e-6);
    assert_abs_diff_eq!(x1, 285.0, epsilon = 1e-6);
}

#[test]
fn new_data_without_selection_clears_the_brush() {
    let mut harness = mount(props());
    drag(&mut harness.host, 170.0, 285.0);
    assert!(harness.host.chart().expect("chart").brush().selection_px().is_some());

    let next = harness.host.props().with_data(full_bucket(&metrics()));
    harness.host.update(next).expect("update");

    let chart = harness.host.chart().expect("chart");
    assert!(chart.brush().selection_px().is_none());
    assert_eq!(chart.x_domain(), (secs(0.0), secs(3_600.0)));
}

#[test]
fn loading_or_unchanged_buckets_are_not_rebound() {
    let mut harness = mount(props());
    let bound = harness.host.chart().expect("chart").main_groups().cloned();

    let loading = metrics().iter().fold(DataBucket::new(), |bucket, metric| {
        bucket.with_entry(metric.series_name(), BucketEntry::loading())
    });
    let next = harness.host.props().with_data(loading);
    harness.host.update(next).expect("update");
    assert_eq!(harness.host.chart().expect("chart").main_groups().cloned(), bound);

    // Same Rc: nothing to diff, the chart only re-renders.
    let same = harness.host.props().clone();
    harness.host.update(same).expect("update");
    let chart = harness.host.chart().expect("chart");
    assert_eq!(chart.main_groups().cloned(), bound);
    assert_eq!(chart.renderer().frames_rendered, 3);
    assert!(chart.last_render_stats().is_noop());
}

#[test]
fn stale_bucket_after_metric_change_is_ignored() {
    let mut harness = mount(props());
    let kept = vec![metrics()[0].clone()];
    let next = harness
        .host
        .props()
        .with_config(config().with_metrics(kept.clone()))
        .with_data(full_bucket(&kept));
    harness.host.update(next).expect("update");
    let bound = harness.host.chart().expect("chart").main_groups().cloned();
    assert_eq!(bound.as_ref().map(|groups| groups.right.len()), Some(0));

    // A late response for the removed metric.
    let late = full_bucket(&metrics()[1..]);
    let next = harness.host.props().with_data(late);
    harness.host.update(next).expect("update");

    let chart = harness.host.chart().expect("chart");
    assert_eq!(chart.main_groups().cloned(), bound);
    assert!(chart.renderer().frames_rendered >= 3);
}

#[test]
fn scale_change_in_config_applies_on_update() {
    let mut harness = mount(props());
    let next = harness
        .host
        .props()
        .with_config(config().with_left_axis(AxisScaleType::Log));
    harness.host.update(next).expect("update");
    assert_eq!(harness.host.lifecycle(), HostLifecycle::Mounted);

    let chart = harness.host.chart().expect("chart");
    assert_eq!(chart.axis_scale(AxisSide::Left), AxisScaleType::Log);
    assert_eq!(chart.axes().get(AxisId::Left).kind(), metric_chart::core::ScaleKind::Log);
}

#[test]
fn resize_is_debounced_to_the_last_width() {
    let mut harness = mount(props());
    for width in [900, 1000, 1100] {
        assert_eq!(harness.events.emit_resize(ResizeEvent { width, height: 400 }), 1);
        harness.clock.advance(Duration::from_millis(100));
    }
    assert!(harness.host.is_render_pending());
    assert_eq!(harness.host.next_deadline(), Some(Duration::from_millis(450)));

    harness.clock.advance(Duration::from_millis(149));
    assert!(!harness.host.poll_timers().expect("poll").rendered);

    harness.clock.advance(Duration::from_millis(1));
    assert!(harness.host.poll_timers().expect("poll").rendered);
    let chart = harness.host.chart().expect("chart");
    assert_eq!(chart.width(), 1_100);
    assert_eq!(chart.viewport().width, 1_100);
    assert_eq!(chart.renderer().frames_rendered, 2);
}

#[test]
fn zero_width_resize_is_skipped() {
    let mut harness = mount(props());
    harness.events.emit_resize(ResizeEvent { width: 0, height: 0 });
    harness.clock.advance(Duration::from_millis(250));

    let firings = harness.host.poll_timers().expect("poll");
    assert!(!firings.rendered);
    assert_eq!(harness.host.chart().expect("chart").width(), 800);
}

#[test]
fn unmount_releases_listener_and_timers() {
    let mut harness = mount(props());
    drag(&mut harness.host, 170.0, 285.0);
    harness.events.emit_resize(ResizeEvent { width: 900, height: 400 });
    assert_eq!(harness.events.listener_count(), 1);

    let renderer = harness.host.unmount().expect("renderer returned");
    // Mount plus the two brush redraws.
    assert_eq!(renderer.frames_rendered, 3);
    assert_eq!(harness.events.listener_count(), 0);
    assert_eq!(harness.events.emit_resize(ResizeEvent { width: 1, height: 1 }), 0);
    assert!(harness.notifications.borrow().is_empty());
}

#[test]
fn dropping_the_host_also_unsubscribes() {
    let harness = mount(props());
    let events = harness.events.clone();
    drop(harness);
    assert_eq!(events.listener_count(), 0);
}

#[test]
fn errored_entries_are_reported() {
    let metric = &metrics()[0];
    let data = DataBucket::new().with_entry(metric.series_name(), BucketEntry::errored("boom"));
    let harness = mount(ChartProps::new(config()).with_data(data));

    assert_eq!(
        harness.host.errors(),
        vec![(metric.series_name(), "boom".to_owned())]
    );
}

#[test]
fn reentering_a_shared_host_is_rejected() {
    let clock = ManualClock::new();
    let events = WindowEvents::new();
    let slot: Rc<RefCell<Option<SharedChartHost<NullRenderer>>>> = Rc::default();
    let outcome: Rc<RefCell<Option<Result<(), ChartError>>>> = Rc::default();

    let callback = {
        let slot = Rc::clone(&slot);
        let outcome = Rc::clone(&outcome);
        move |_: usize, _: Option<TimeRange>| {
            if let Some(shared) = slot.borrow().as_ref() {
                *outcome.borrow_mut() = Some(shared.with(ChartHost::render));
            }
        }
    };
    let mount = HostMount::new(0, 800, events).with_clock(Rc::new(clock.clone()));
    let host = ChartHost::mount(NullRenderer::default(), props(), mount, callback).expect("mount");
    let shared = SharedChartHost::new(host);
    *slot.borrow_mut() = Some(shared.clone());

    shared
        .with(|host| {
            drag(host, 170.0, 285.0);
            Ok(())
        })
        .expect("drag");
    clock.advance(Duration::from_millis(600));
    let firings = shared.with(ChartHost::poll_timers).expect("poll");
    assert!(firings.selection_notified);
    assert!(matches!(
        outcome.borrow_mut().take(),
        Some(Err(ChartError::ReentrantRender))
    ));

    slot.borrow_mut().take();
    assert!(shared.unmount().is_some());
}

#[test]
fn invalid_config_update_is_rejected_and_props_kept() {
    let mut harness = mount(props());
    let before = Rc::clone(&harness.host.props().config);
    let next = harness
        .host
        .props()
        .with_config(ChartConfig::new(at(3_600), at(0)));

    assert!(matches!(harness.host.update(next), Err(ChartError::InvalidData(_))));
    assert!(Rc::ptr_eq(&harness.host.props().config, &before));
    assert_eq!(harness.host.lifecycle(), HostLifecycle::Mounted);
}
