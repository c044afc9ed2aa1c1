//! Trailing-window extremes and means used for swing and range geometry.
//!
//! These operate on the most recent `window` values of a series, which is
//! how the detectors read swing highs/lows and consolidation ranges.

/// Highest value over the trailing `window` values.
///
/// Returns None when the series is shorter than the window, the window is
/// zero, or any value inside it is NaN.
pub fn highest(values: &[f64], window: usize) -> Option<f64> {
    trailing(values, window).and_then(|w| fold_extreme(w, f64::max))
}

/// Lowest value over the trailing `window` values.
pub fn lowest(values: &[f64], window: usize) -> Option<f64> {
    trailing(values, window).and_then(|w| fold_extreme(w, f64::min))
}

/// Arithmetic mean of a slice. None for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// The last `window` values of a series, if there are that many.
pub fn trailing(values: &[f64], window: usize) -> Option<&[f64]> {
    if window == 0 || values.len() < window {
        return None;
    }
    Some(&values[values.len() - window..])
}

fn fold_extreme(window: &[f64], pick: fn(f64, f64) -> f64) -> Option<f64> {
    let mut iter = window.iter().copied();
    let first = iter.next()?;
    if first.is_nan() {
        return None;
    }
    let mut acc = first;
    for v in iter {
        if v.is_nan() {
            return None;
        }
        acc = pick(acc, v);
    }
    Some(acc)
}
