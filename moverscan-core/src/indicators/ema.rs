//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * value[t] + (1 - alpha) * EMA[t-1]
//! Seed: EMA[0] = value[0]. No SMA warm-up; every index carries a value.
//!
//! The pullback band (close within 3% of the 20 EMA) and the stop buffers
//! were tuned against this seeding, so it stays.

/// Compute the EMA of `values` with the given period.
///
/// The output has the same length as the input. An empty input yields an
/// empty series; a zero period is treated as period 1.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };

    let alpha = 2.0 / (period.max(1) as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    result.push(first);

    let mut prev = first;
    for &v in &values[1..] {
        let e = v * alpha + prev * (1.0 - alpha);
        result.push(e);
        prev = e;
    }

    result
}
