//! Simple Moving Average (SMA).
//!
//! Rolling mean over a trailing window, index-aligned with the input.
//! Indices before the window is full hold NaN (first value at period-1).

/// Compute the SMA of `values` over `period` values.
///
/// NaN inside a window makes that window's mean NaN. A zero period yields
/// an all-NaN series.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    // Initial window sum
    let mut sum: f64 = values[..period].iter().sum();
    result[period - 1] = sum / period as f64;

    // Roll the window forward
    for i in period..n {
        let leaving = values[i - period];
        let entering = values[i];
        if leaving.is_nan() || entering.is_nan() || sum.is_nan() {
            // NaN poisons a running sum; recompute from the window instead
            sum = values[(i + 1 - period)..=i].iter().sum();
        } else {
            sum = sum - leaving + entering;
        }
        result[i] = sum / period as f64;
    }

    result
}
