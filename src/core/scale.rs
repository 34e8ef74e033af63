use serde::{Deserialize, Serialize};

/// Number of ticks `nice()` aims for, matching the usual axis density.
pub const DEFAULT_NICE_TICK_COUNT: usize = 10;

/// Mapping implementation behind a continuous scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleKind {
    Linear,
    Log,
    /// Linear mapping over unix seconds; ticks and labels are calendar aware.
    Time,
}

/// Continuous domain -> pixel mapping.
///
/// Domain and range are both stored as given; either may be descending (the
/// y axes map their domain onto a bottom-to-top pixel range).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousScale {
    kind: ScaleKind,
    domain: (f64, f64),
    range: (f64, f64),
}

impl ContinuousScale {
    #[must_use]
    pub fn new(kind: ScaleKind) -> Self {
        let domain = match kind {
            ScaleKind::Log => (1.0, 10.0),
            ScaleKind::Linear | ScaleKind::Time => (0.0, 1.0),
        };
        Self {
            kind,
            domain,
            range: (0.0, 1.0),
        }
    }

    #[must_use]
    pub fn linear() -> Self {
        Self::new(ScaleKind::Linear)
    }

    #[must_use]
    pub fn log() -> Self {
        Self::new(ScaleKind::Log)
    }

    #[must_use]
    pub fn time() -> Self {
        Self::new(ScaleKind::Time)
    }

    #[must_use]
    pub fn with_domain(mut self, start: f64, end: f64) -> Self {
        self.set_domain(start, end);
        self
    }

    #[must_use]
    pub fn with_range(mut self, start: f64, end: f64) -> Self {
        self.set_range(start, end);
        self
    }

    #[must_use]
    pub fn kind(self) -> ScaleKind {
        self.kind
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.range
    }

    pub fn set_domain(&mut self, start: f64, end: f64) {
        self.domain = (start, end);
    }

    pub fn set_range(&mut self, start: f64, end: f64) {
        self.range = (start, end);
    }

    /// Returns whether every domain value maps to a finite pixel.
    ///
    /// Log scales require a domain that does not touch or cross zero.
    #[must_use]
    pub fn has_valid_domain(self) -> bool {
        let (d0, d1) = self.domain;
        if !d0.is_finite() || !d1.is_finite() {
            return false;
        }
        match self.kind {
            ScaleKind::Log => (d0 > 0.0 && d1 > 0.0) || (d0 < 0.0 && d1 < 0.0),
            ScaleKind::Linear | ScaleKind::Time => true,
        }
    }

    /// Maps a domain value to pixels.
    ///
    /// Returns `None` for non-finite input and for values outside a log
    /// scale's sign domain, which callers treat as undefined points.
    #[must_use]
    pub fn map(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let d0 = self.forward(self.domain.0)?;
        let d1 = self.forward(self.domain.1)?;
        let t = self.forward(value)?;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return Some((r0 + r1) / 2.0);
        }
        let mapped = r0 + (t - d0) / (d1 - d0) * (r1 - r0);
        mapped.is_finite().then_some(mapped)
    }

    /// Maps a pixel back into the domain.
    #[must_use]
    pub fn invert(self, pixel: f64) -> Option<f64> {
        if !pixel.is_finite() {
            return None;
        }
        let d0 = self.forward(self.domain.0)?;
        let d1 = self.forward(self.domain.1)?;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return Some(self.domain.0);
        }
        let t = d0 + (pixel - r0) / (r1 - r0) * (d1 - d0);
        let value = self.backward(t);
        value.is_finite().then_some(value)
    }

    /// Rounds a linear domain outward to tick-friendly bounds.
    ///
    /// Other kinds are left untouched.
    pub fn nice(&mut self) {
        self.nice_with_count(DEFAULT_NICE_TICK_COUNT);
    }

    pub fn nice_with_count(&mut self, count: usize) {
        if self.kind != ScaleKind::Linear {
            return;
        }
        let (start, end) = self.domain;
        if start <= end {
            self.domain = nice_domain(start, end, count);
        } else {
            let (lo, hi) = nice_domain(end, start, count);
            self.domain = (hi, lo);
        }
    }

    /// Tick values for numeric scales. Time ticks live with the axis code.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let (lo, hi) = (d0.min(d1), d0.max(d1));
        match self.kind {
            ScaleKind::Linear | ScaleKind::Time => linear_ticks(lo, hi, count),
            ScaleKind::Log => log_ticks(lo, hi, count),
        }
    }

    fn log_reflected(self) -> bool {
        self.domain.0 < 0.0
    }

    fn forward(self, value: f64) -> Option<f64> {
        match self.kind {
            ScaleKind::Linear | ScaleKind::Time => Some(value),
            ScaleKind::Log if self.log_reflected() => (value < 0.0).then(|| -(-value).ln()),
            ScaleKind::Log => (value > 0.0).then(|| value.ln()),
        }
    }

    fn backward(self, transformed: f64) -> f64 {
        match self.kind {
            ScaleKind::Linear | ScaleKind::Time => transformed,
            ScaleKind::Log if self.log_reflected() => -(-transformed).exp(),
            ScaleKind::Log => transformed.exp(),
        }
    }
}

/// Step between ticks for `[start, stop]` at roughly `count` ticks.
///
/// Positive results are the step itself; negative results encode a step of
/// `1 / -result`, which keeps fractional steps exact.
#[must_use]
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

/// Expands `[start, stop]` outward to multiples of its tick step.
#[must_use]
pub fn nice_domain(start: f64, stop: f64, count: usize) -> (f64, f64) {
    let (mut start, mut stop) = (start, stop);
    let mut previous_step: Option<f64> = None;

    for _ in 0..10 {
        let step = tick_increment(start, stop, count);
        if previous_step == Some(step) || step == 0.0 {
            break;
        }
        if step > 0.0 {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else {
            start = (start * step).ceil() / step;
            stop = (stop * step).floor() / step;
        }
        previous_step = Some(step);
    }

    (start, stop)
}

/// Evenly spaced ticks inside `[lo, hi]`.
#[must_use]
pub fn linear_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if !lo.is_finite() || !hi.is_finite() || count == 0 {
        return Vec::new();
    }
    if lo == hi {
        return vec![lo];
    }
    let step = tick_increment(lo, hi, count);
    if step > 0.0 {
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    } else if step < 0.0 {
        let inverse = -step;
        let first = (lo * inverse).ceil() as i64;
        let last = (hi * inverse).floor() as i64;
        (first..=last).map(|i| i as f64 / inverse).collect()
    } else {
        Vec::new()
    }
}

/// Powers of ten inside `[lo, hi]`, plus their 2..9 multiples when the
/// domain spans fewer than `count` decades.
#[must_use]
pub fn log_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if !(lo > 0.0 && hi > 0.0 && lo.is_finite() && hi.is_finite()) {
        return Vec::new();
    }
    let first = lo.log10().floor() as i32;
    let last = hi.log10().ceil() as i32;
    let dense = ((last - first) as usize) < count.max(1);
    let mut ticks = Vec::new();
    for exponent in first..=last {
        let base = 10f64.powi(exponent);
        let multiples: &[f64] = if dense {
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        } else {
            &[1.0]
        };
        for multiple in multiples {
            let value = base * multiple;
            if value >= lo && value <= hi {
                ticks.push(value);
            }
        }
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::{ContinuousScale, ScaleKind, linear_ticks, log_ticks, nice_domain};

    #[test]
    fn nice_rounds_outward_to_step_multiples() {
        assert_eq!(nice_domain(10.0, 1000.0, 10), (0.0, 1000.0));
        assert_eq!(nice_domain(0.13, 0.97, 10), (0.1, 1.0));
        assert_eq!(nice_domain(4.0, 6.0, 10), (4.0, 6.0));
    }

    #[test]
    fn map_and_invert_follow_descending_pixel_range() {
        let scale = ContinuousScale::linear()
            .with_domain(0.0, 100.0)
            .with_range(270.0, 10.0);
        assert_eq!(scale.map(0.0), Some(270.0));
        assert_eq!(scale.map(100.0), Some(10.0));
        let value = scale.invert(140.0).expect("invertible");
        assert!((value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn log_scale_rejects_non_positive_values() {
        let scale = ContinuousScale::log()
            .with_domain(10.0, 1000.0)
            .with_range(0.0, 200.0);
        assert_eq!(scale.map(0.0), None);
        assert_eq!(scale.map(-4.0), None);
        let mid = scale.map(100.0).expect("mapped");
        assert!((mid - 100.0).abs() < 1e-9);
    }

    #[test]
    fn nice_is_a_no_op_for_log_and_time() {
        let mut log = ContinuousScale::log().with_domain(3.0, 870.0);
        log.nice();
        assert_eq!(log.domain(), (3.0, 870.0));

        let mut time = ContinuousScale::new(ScaleKind::Time).with_domain(13.0, 97.0);
        time.nice();
        assert_eq!(time.domain(), (13.0, 97.0));
    }

    #[test]
    fn flat_domain_maps_to_range_midpoint() {
        let scale = ContinuousScale::linear()
            .with_domain(5.0, 5.0)
            .with_range(0.0, 100.0);
        assert_eq!(scale.map(5.0), Some(50.0));
    }

    #[test]
    fn tick_generators_stay_inside_domain() {
        assert_eq!(linear_ticks(0.0, 1.0, 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(log_ticks(1.0, 1e12, 10), (0..=12).map(|e| 10f64.powi(e)).collect::<Vec<_>>());
        assert_eq!(log_ticks(1.0, 30.0, 10).len(), 12);
    }
}
