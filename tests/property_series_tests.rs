use metric_chart::core::{AxisSide, ContinuousScale, Row, Series, compute_y_domain};
use metric_chart::interaction::{HOVER_TOLERANCE_PX, hovered_row, nearest_row};
use proptest::prelude::*;

proptest! {
    #[test]
    fn y_domain_covers_every_defined_value(
        values in proptest::collection::vec(proptest::option::of(-1_000.0f64..1_000.0), 1..64)
    ) {
        let rows: Vec<Row> = values
            .iter()
            .enumerate()
            .map(|(i, value)| Row::new(i as f64, *value))
            .collect();
        let defined: Vec<f64> = values.iter().flatten().copied().collect();
        let series = vec![Series::new("s", AxisSide::Left, rows)];

        match compute_y_domain(&series) {
            None => prop_assert!(defined.is_empty()),
            Some((min, max)) => {
                prop_assert!(min < max);
                for value in defined {
                    prop_assert!(value >= min && value <= max);
                }
            }
        }
    }

    #[test]
    fn nearest_row_is_never_farther_than_any_other(
        mut times in proptest::collection::vec(0.0f64..10_000.0, 1..64),
        probe in 0.0f64..10_000.0
    ) {
        times.sort_by(f64::total_cmp);
        let rows: Vec<Row> = times.iter().map(|t| Row::value(*t, 1.0)).collect();

        let nearest = nearest_row(&rows, probe).expect("non-empty rows");
        let best = times
            .iter()
            .map(|t| (t - probe).abs())
            .fold(f64::INFINITY, f64::min);
        prop_assert!(((nearest.time - probe).abs() - best).abs() <= 1e-9);
    }

    #[test]
    fn hovered_row_stays_within_tolerance(
        mut times in proptest::collection::vec(0.0f64..3_600.0, 1..32),
        pointer in 0.0f64..690.0
    ) {
        times.sort_by(f64::total_cmp);
        let rows: Vec<Row> = times.iter().map(|t| Row::value(*t, 1.0)).collect();
        let scale = ContinuousScale::time().with_domain(0.0, 3_600.0).with_range(0.0, 690.0);

        if let Some(row) = hovered_row(&rows, scale, pointer) {
            let x = scale.map(row.time).expect("finite");
            prop_assert!((x - pointer).abs() < HOVER_TOLERANCE_PX);
        }
    }
}
