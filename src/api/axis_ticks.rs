use chrono::{DateTime, Datelike, Months, TimeZone, Timelike, Utc, Weekday};

use crate::core::scale::tick_increment;
use crate::core::{ContinuousScale, ScaleKind, datetime_to_unix_seconds, unix_seconds_to_datetime};
use crate::render::AxisTick;

pub(super) const AXIS_TIME_TARGET_SPACING_PX: f64 = 72.0;
pub(super) const AXIS_VALUE_TARGET_SPACING_PX: f64 = 36.0;
const MIN_TICKS: usize = 2;
const MAX_TICKS: usize = 10;
const MAX_TIME_TICKS: usize = 1_000;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 3_600.0;
const DAY: f64 = 86_400.0;
const WEEK: f64 = 7.0 * DAY;
/// 1970-01-04 was a Sunday; weekly ticks land on Sundays.
const SUNDAY_ANCHOR: f64 = 3.0 * DAY;

pub(super) fn axis_tick_target_count(
    axis_span_px: f64,
    target_spacing_px: f64,
    min_ticks: usize,
    max_ticks: usize,
) -> usize {
    if !axis_span_px.is_finite() || axis_span_px <= 0.0 {
        return min_ticks;
    }
    if !target_spacing_px.is_finite() || target_spacing_px <= 0.0 {
        return min_ticks;
    }

    let raw = (axis_span_px / target_spacing_px).floor() as usize + 1;
    raw.clamp(min_ticks, max_ticks)
}

/// Ticks for a linear or log y axis.
///
/// Log axes label powers of ten only; the in-between multiples stay as
/// unlabeled ticks.
#[must_use]
pub fn value_axis_ticks(scale: ContinuousScale) -> Vec<AxisTick> {
    if !scale.has_valid_domain() {
        return Vec::new();
    }
    let (r0, r1) = scale.range();
    let count = axis_tick_target_count(
        (r1 - r0).abs(),
        AXIS_VALUE_TARGET_SPACING_PX,
        MIN_TICKS,
        MAX_TICKS,
    );
    let (d0, d1) = scale.domain();
    let precision = linear_precision(tick_increment(d0.min(d1), d0.max(d1), count));

    scale
        .ticks(count)
        .into_iter()
        .filter_map(|value| {
            let label = match scale.kind() {
                ScaleKind::Log if is_power_of_ten(value) => {
                    format_grouped(value, log_precision(value))
                }
                ScaleKind::Log => String::new(),
                ScaleKind::Linear | ScaleKind::Time => format_grouped(value, precision),
            };
            Some(AxisTick {
                value,
                position: scale.map(value)?,
                label,
            })
        })
        .collect()
}

/// Calendar-aligned ticks for a time axis, labeled in UTC.
#[must_use]
pub fn time_axis_ticks(scale: ContinuousScale) -> Vec<AxisTick> {
    let (d0, d1) = scale.domain();
    let (lo, hi) = (d0.min(d1), d0.max(d1));
    if !lo.is_finite() || !hi.is_finite() || hi <= lo {
        return Vec::new();
    }
    let (r0, r1) = scale.range();
    let count = axis_tick_target_count(
        (r1 - r0).abs(),
        AXIS_TIME_TARGET_SPACING_PX,
        MIN_TICKS,
        MAX_TICKS,
    );
    let interval = TimeInterval::for_target((hi - lo) / count as f64);

    interval
        .ticks(lo, hi)
        .into_iter()
        .filter_map(|value| {
            let datetime = unix_seconds_to_datetime(value)?;
            Some(AxisTick {
                value,
                position: scale.map(value)?,
                label: format_time_tick(datetime),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TimeInterval {
    Fixed { step: f64, anchor: f64 },
    Months(u32),
    Years(i32),
}

impl TimeInterval {
    const fn fixed(step: f64) -> Self {
        Self::Fixed { step, anchor: 0.0 }
    }

    fn for_target(target: f64) -> Self {
        const LADDER: [TimeInterval; 17] = [
            TimeInterval::fixed(1.0),
            TimeInterval::fixed(5.0),
            TimeInterval::fixed(15.0),
            TimeInterval::fixed(30.0),
            TimeInterval::fixed(MINUTE),
            TimeInterval::fixed(5.0 * MINUTE),
            TimeInterval::fixed(15.0 * MINUTE),
            TimeInterval::fixed(30.0 * MINUTE),
            TimeInterval::fixed(HOUR),
            TimeInterval::fixed(3.0 * HOUR),
            TimeInterval::fixed(6.0 * HOUR),
            TimeInterval::fixed(12.0 * HOUR),
            TimeInterval::fixed(DAY),
            TimeInterval::fixed(2.0 * DAY),
            TimeInterval::Fixed {
                step: WEEK,
                anchor: SUNDAY_ANCHOR,
            },
            TimeInterval::Months(1),
            TimeInterval::Months(3),
        ];

        if target < 1.0 {
            let step = match tick_increment(0.0, target * 10.0, 10) {
                inc if inc < 0.0 => 1.0 / -inc,
                inc => inc,
            };
            return Self::fixed(step.max(0.001));
        }
        LADDER
            .into_iter()
            .find(|interval| interval.approx_seconds() >= target)
            .unwrap_or_else(|| {
                let years = (target / (365.0 * DAY)).max(1.0);
                Self::Years(nice_step_at_least(years) as i32)
            })
    }

    fn approx_seconds(self) -> f64 {
        match self {
            Self::Fixed { step, .. } => step,
            Self::Months(months) => f64::from(months) * 30.0 * DAY,
            Self::Years(years) => f64::from(years) * 365.0 * DAY,
        }
    }

    fn ticks(self, lo: f64, hi: f64) -> Vec<f64> {
        match self {
            Self::Fixed { step, anchor } => {
                let mut value = ((lo - anchor) / step).ceil() * step + anchor;
                let mut ticks = Vec::new();
                while value <= hi && ticks.len() < MAX_TIME_TICKS {
                    ticks.push(value);
                    value += step;
                }
                ticks
            }
            Self::Months(months) => calendar_ticks(lo, hi, months),
            Self::Years(years) => calendar_ticks(lo, hi, years.unsigned_abs() * 12),
        }
    }
}

/// Month starts inside `[lo, hi]` whose month index is a multiple of `step`.
fn calendar_ticks(lo: f64, hi: f64, step: u32) -> Vec<f64> {
    let step = step.max(1);
    let Some(start) = unix_seconds_to_datetime(lo) else {
        return Vec::new();
    };
    let Some(mut cursor) = Utc
        .with_ymd_and_hms(start.year(), start.month(), 1, 0, 0, 0)
        .single()
    else {
        return Vec::new();
    };

    let mut ticks = Vec::new();
    while ticks.len() < MAX_TIME_TICKS {
        let value = datetime_to_unix_seconds(cursor);
        if value > hi {
            break;
        }
        let month_index = cursor.year() as i64 * 12 + i64::from(cursor.month0());
        if value >= lo && month_index.rem_euclid(i64::from(step)) == 0 {
            ticks.push(value);
        }
        let Some(next) = cursor.checked_add_months(Months::new(1)) else {
            break;
        };
        cursor = next;
    }
    ticks
}

/// Multi-scale label: the coarsest unit that the tick is not aligned to.
#[must_use]
pub fn format_time_tick(datetime: DateTime<Utc>) -> String {
    let pattern = if datetime.nanosecond() != 0 {
        ".%3f"
    } else if datetime.second() != 0 {
        ":%S"
    } else if datetime.minute() != 0 {
        "%I:%M"
    } else if datetime.hour() != 0 {
        "%I %p"
    } else if datetime.day() != 1 {
        if datetime.weekday() == Weekday::Sun {
            "%b %d"
        } else {
            "%a %d"
        }
    } else if datetime.month() != 1 {
        "%B"
    } else {
        "%Y"
    };
    datetime.format(pattern).to_string()
}

/// Fixed-point label with `,` thousands grouping.
#[must_use]
pub fn format_grouped(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*}", precision, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + integer.len() / 3 + 1);
    let is_zero = formatted.bytes().all(|byte| byte == b'0' || byte == b'.');
    if value < 0.0 && !is_zero {
        grouped.push('-');
    }
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

fn linear_precision(increment: f64) -> usize {
    if increment < 0.0 {
        (-increment).log10().ceil().max(0.0) as usize
    } else {
        0
    }
}

fn log_precision(value: f64) -> usize {
    if value < 1.0 {
        (-value.log10()).round().max(0.0) as usize
    } else {
        0
    }
}

fn is_power_of_ten(value: f64) -> bool {
    if value <= 0.0 {
        return false;
    }
    let exponent = value.log10().round() as i32;
    (10f64.powi(exponent) - value).abs() <= value * 1e-9
}

fn nice_step_at_least(value: f64) -> f64 {
    let power = 10f64.powf(value.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|multiple| multiple * power)
        .find(|step| *step >= value)
        .unwrap_or(10.0 * power)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{format_grouped, format_time_tick, time_axis_ticks, value_axis_ticks};
    use crate::core::{ContinuousScale, datetime_to_unix_seconds};

    #[test]
    fn grouped_labels_follow_precision() {
        assert_eq!(format_grouped(1_234_567.0, 0), "1,234,567");
        assert_eq!(format_grouped(-0.25, 2), "-0.25");
        assert_eq!(format_grouped(-0.0001, 1), "0.0");
        assert_eq!(format_grouped(999.0, 0), "999");
    }

    #[test]
    fn linear_ticks_get_step_precision() {
        let scale = ContinuousScale::linear()
            .with_domain(0.0, 1.0)
            .with_range(260.0, 0.0);
        let labels: Vec<String> = value_axis_ticks(scale)
            .into_iter()
            .map(|tick| tick.label)
            .collect();
        assert_eq!(labels.first().map(String::as_str), Some("0.0"));
        assert_eq!(labels.last().map(String::as_str), Some("1.0"));
    }

    #[test]
    fn log_ticks_label_powers_of_ten_only() {
        let scale = ContinuousScale::log()
            .with_domain(1.0, 1000.0)
            .with_range(260.0, 0.0);
        let ticks = value_axis_ticks(scale);
        let labeled: Vec<&str> = ticks
            .iter()
            .filter(|tick| !tick.label.is_empty())
            .map(|tick| tick.label.as_str())
            .collect();
        assert_eq!(labeled, vec!["1", "10", "100", "1,000"]);
        assert!(ticks.len() > labeled.len());
    }

    #[test]
    fn hour_span_ticks_every_quarter_hour() {
        let start = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).single().expect("date");
        let t0 = datetime_to_unix_seconds(start);
        let scale = ContinuousScale::time()
            .with_domain(t0, t0 + 3_600.0)
            .with_range(55.0, 745.0);
        let ticks = time_axis_ticks(scale);
        assert_eq!(ticks.len(), 5);
        assert_eq!(ticks[0].label, "12 PM");
        assert_eq!(ticks[1].label, "12:15");
    }

    #[test]
    fn multi_format_picks_coarsest_unaligned_unit() {
        let at = |y, mo, d, h, mi, s| {
            Utc.with_ymd_and_hms(y, mo, d, h, mi, s).single().expect("date")
        };
        assert_eq!(format_time_tick(at(2024, 1, 1, 0, 0, 0)), "2024");
        assert_eq!(format_time_tick(at(2024, 3, 1, 0, 0, 0)), "March");
        assert_eq!(format_time_tick(at(2024, 3, 3, 0, 0, 0)), "Mar 03");
        assert_eq!(format_time_tick(at(2024, 3, 5, 0, 0, 0)), "Tue 05");
        assert_eq!(format_time_tick(at(2024, 3, 5, 0, 0, 30)), ":30");
    }
}
