// Forecast extrapolation from a short list of known points
use super::reading::{ForecastPoint, Series, round_to};
use std::collections::BTreeMap;

/// Known values keyed by zero-based output index (`offset_weeks - 1`).
/// A later point for the same offset replaces an earlier one.
fn known_points(points: &[ForecastPoint]) -> BTreeMap<usize, f64> {
    points
        .iter()
        .filter(|p| p.offset_weeks >= 1 && p.is_known())
        .filter_map(|p| p.value.map(|v| (p.offset_weeks as usize - 1, v)))
        .collect()
}

/// Place the supplied points at their offsets without filling gaps.
///
/// Index 0 is one week ahead. Offsets past `future_weeks` are truncated.
pub fn seed(points: &[ForecastPoint], future_weeks: usize) -> Series {
    let mut series = vec![None; future_weeks];
    for (idx, value) in known_points(points) {
        if idx < future_weeks {
            series[idx] = Some(value);
        }
    }
    series
}

/// Extend the supplied points to `future_weeks` values.
///
/// With two or more known points the line through the last two continues past
/// the last one. A single known point is held flat. Without known points only
/// `None` is produced.
pub fn extrapolate(points: &[ForecastPoint], future_weeks: usize) -> Series {
    let mut series = seed(points, future_weeks);
    let known: Vec<(usize, f64)> = known_points(points).into_iter().collect();

    match known.as_slice() {
        [] => {}
        [(idx, value)] => {
            for slot in series.iter_mut().skip(idx + 1) {
                *slot = Some(*value);
            }
        }
        [.., (a_idx, a), (b_idx, b)] => {
            let slope = (b - a) / (b_idx - a_idx) as f64;
            let places = if a.fract() != 0.0 || b.fract() != 0.0 { 2 } else { 0 };
            for k in (b_idx + 1)..future_weeks {
                let value = b + slope * (k - b_idx) as f64;
                series[k] = Some(round_to(value, places));
            }
        }
    }

    series
}
