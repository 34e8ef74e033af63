use metric_chart::core::{
    AxisSide, BucketEntry, ContinuousScale, DataBucket, MetricConfig, Row, Series, SeriesModel,
    compute_y_domain, project_path_runs,
};

fn metric(name: &str, axis: AxisSide) -> MetricConfig {
    MetricConfig::new("prod", "api", name, "p99")
        .with_axis(axis)
        .with_duration_unit("ms")
}

#[test]
fn flat_series_widens_by_twenty_percent() {
    let series = vec![Series::new(
        "flat",
        AxisSide::Left,
        vec![Row::value(0.0, 5.0), Row::value(1.0, 5.0)],
    )];
    assert_eq!(compute_y_domain(&series), Some((4.0, 6.0)));
}

#[test]
fn flat_zero_series_uses_fixed_domain() {
    let series = vec![Series::new(
        "zero",
        AxisSide::Left,
        vec![Row::value(0.0, 0.0), Row::value(1.0, 0.0)],
    )];
    assert_eq!(compute_y_domain(&series), Some((-5.0, 5.0)));
}

#[test]
fn gap_renders_as_two_disjoint_runs() {
    let rows = vec![Row::value(0.0, 1.0), Row::gap(1.0), Row::value(2.0, 3.0)];
    let x = ContinuousScale::time().with_domain(0.0, 2.0).with_range(0.0, 200.0);
    let y = ContinuousScale::linear().with_domain(0.0, 4.0).with_range(100.0, 0.0);

    let runs = project_path_runs(&rows, x, y);
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].points, vec![(0.0, 75.0)]);
    assert_eq!(runs[1].points, vec![(200.0, 25.0)]);
    assert_eq!(runs.iter().flat_map(|run| run.segments()).count(), 0);
}

#[test]
fn stale_only_bucket_is_rejected() {
    let model = SeriesModel::new(&[metric("latency", AxisSide::Left)]);
    let stale = DataBucket::new().with_entry(
        "prod.api.removed.p99",
        BucketEntry::ready(vec![Row::value(0.0, 1.0)]),
    );
    assert!(model.bind(&stale).is_none());
}

#[test]
fn partially_stale_bucket_binds_known_entries_in_metric_order() {
    let left = metric("latency", AxisSide::Left);
    let right = metric("throughput", AxisSide::Right);
    let model = SeriesModel::new(&[left.clone(), right.clone()]);
    let bucket = DataBucket::new()
        .with_entry(right.series_name(), BucketEntry::ready(vec![Row::value(0.0, 2.0)]))
        .with_entry("prod.api.removed.p99", BucketEntry::ready(vec![Row::value(0.0, 9.0)]))
        .with_entry(left.series_name(), BucketEntry::ready(vec![Row::value(0.0, 1.0)]));

    let groups = model.bind(&bucket).expect("known entries bind");
    assert_eq!(groups.left.len(), 1);
    assert_eq!(groups.right.len(), 1);
    assert_eq!(groups.left[0].name, left.series_name());
    assert_eq!(groups.left[0].unit.as_deref(), Some("ms"));
    assert_eq!(groups.find_axis(&right.series_name()), Some(AxisSide::Right));
}

#[test]
fn loading_and_errored_entries_are_never_bound() {
    let left = metric("latency", AxisSide::Left);
    let right = metric("throughput", AxisSide::Right);
    let model = SeriesModel::new(&[left.clone(), right.clone()]);
    let bucket = DataBucket::new()
        .with_entry(left.series_name(), BucketEntry::loading())
        .with_entry(right.series_name(), BucketEntry::errored("upstream timeout"));

    let groups = model.bind(&bucket).expect("entries are configured");
    assert!(groups.is_empty());
    assert!(bucket.is_loading());
    assert_eq!(
        bucket.errors(),
        vec![(right.series_name(), "upstream timeout".to_owned())]
    );
}

#[test]
fn bucket_rows_parse_from_wire_millis() {
    let bucket = DataBucket::from_json_str(
        r#"{
            "prod.api.latency.p99": {
                "loading": false,
                "error": null,
                "rows": [[1700000000000, 12.5], [1700000060000, null]]
            }
        }"#,
    )
    .expect("bucket parses");

    let entry = bucket.get("prod.api.latency.p99").expect("entry");
    assert_eq!(entry.rows[0], Row::value(1_700_000_000.0, 12.5));
    assert_eq!(entry.rows[1], Row::gap(1_700_000_060.0));
    assert!(!bucket.is_loading());
}

#[test]
fn malformed_bucket_is_invalid_data() {
    let result = DataBucket::from_json_str(r#"{"a": {"rows": [["x", 1]]}}"#);
    assert!(matches!(
        result,
        Err(metric_chart::ChartError::InvalidData(_))
    ));
}
