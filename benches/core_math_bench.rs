use criterion::{Criterion, criterion_group, criterion_main};
use metric_chart::api::TimeSeriesChart;
use metric_chart::core::{
    AxisSide, BucketEntry, ContinuousScale, DataBucket, MetricConfig, Row, Series,
    compute_y_domain, project_path_runs,
};
use metric_chart::interaction::nearest_row;
use metric_chart::render::NullRenderer;
use std::hint::black_box;

fn sine_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            let t = i as f64 * 10.0;
            if i % 97 == 0 {
                Row::gap(t)
            } else {
                Row::value(t, 100.0 + (t / 300.0).sin() * 25.0)
            }
        })
        .collect()
}

fn bench_y_domain_10k(c: &mut Criterion) {
    let series = vec![
        Series::new("a", AxisSide::Left, sine_rows(10_000)),
        Series::new("b", AxisSide::Left, sine_rows(10_000)),
    ];

    c.bench_function("y_domain_2x10k", |b| {
        b.iter(|| compute_y_domain(black_box(&series)))
    });
}

fn bench_path_projection_10k(c: &mut Criterion) {
    let rows = sine_rows(10_000);
    let x = ContinuousScale::time()
        .with_domain(0.0, 100_000.0)
        .with_range(55.0, 1_545.0);
    let y = ContinuousScale::linear()
        .with_domain(70.0, 130.0)
        .with_range(270.0, 10.0);

    c.bench_function("path_projection_10k", |b| {
        b.iter(|| project_path_runs(black_box(&rows), black_box(x), black_box(y)))
    });
}

fn bench_nearest_row_lookup(c: &mut Criterion) {
    let rows = sine_rows(10_000);

    c.bench_function("nearest_row_10k", |b| {
        b.iter(|| nearest_row(black_box(&rows), black_box(54_321.0)))
    });
}

fn bench_render_pass_2x2k(c: &mut Criterion) {
    let metrics = [
        MetricConfig::new("prod", "api", "latency", "p99").with_axis(AxisSide::Left),
        MetricConfig::new("prod", "api", "requests", "mean_rate").with_axis(AxisSide::Right),
    ];
    let bucket = metrics.iter().fold(DataBucket::new(), |bucket, metric| {
        bucket.with_entry(metric.series_name(), BucketEntry::ready(sine_rows(2_000)))
    });
    let mut chart =
        TimeSeriesChart::new(NullRenderer::default(), &metrics, 1_600).expect("chart init");
    chart.set_preview_data(&bucket).set_main_data(&bucket);

    c.bench_function("render_pass_2x2k", |b| {
        b.iter(|| {
            chart.render().expect("render");
        })
    });

    c.bench_function("pointer_move_2x2k", |b| {
        b.iter(|| {
            chart.pointer_move(black_box(600.0), 120.0).expect("pointer move");
        })
    });
}

criterion_group!(
    benches,
    bench_y_domain_10k,
    bench_path_projection_10k,
    bench_nearest_row_lookup,
    bench_render_pass_2x2k
);
criterion_main!(benches);
