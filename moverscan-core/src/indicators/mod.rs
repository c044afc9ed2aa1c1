//! Indicator engine.
//!
//! Indicators are plain functions over `f64` slices. Every series they
//! return is index-aligned 1:1 with its input, so `ema(closes, 20)[i]`
//! belongs to candle `i`.

pub mod ema;
pub mod extremes;
pub mod sma;

pub use ema::ema;
pub use extremes::{highest, lowest, mean, trailing};
pub use sma::sma;

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
