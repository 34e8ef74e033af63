use serde::{Deserialize, Serialize};

use crate::core::{ContinuousScale, Row};

/// One unbroken stretch of a line path in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathRun {
    pub points: Vec<(f64, f64)>,
}

impl PathRun {
    /// Adjacent point pairs, ready for segment-based backends.
    pub fn segments(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

/// Projects rows into line runs, starting a new run after every undefined row.
///
/// A row is undefined when its value is a gap or does not map to a finite
/// pixel (for example zero on a log scale). Neighbours of an undefined row are
/// never joined.
#[must_use]
pub fn project_path_runs(
    rows: &[Row],
    x_scale: ContinuousScale,
    y_scale: ContinuousScale,
) -> Vec<PathRun> {
    let mut runs = Vec::new();
    let mut current = PathRun::default();

    for row in rows {
        let projected = row
            .value
            .and_then(|value| Some((x_scale.map(row.time)?, y_scale.map(value)?)));
        match projected {
            Some(point) => current.points.push(point),
            None => {
                if !current.points.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.points.is_empty() {
        runs.push(current);
    }

    runs
}
