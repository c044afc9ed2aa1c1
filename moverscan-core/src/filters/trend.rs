//! Trend classifier — directional bias from close/EMA alignment and slope.
//!
//! Applied identically to the daily and the 4h series with a 20/50 EMA pair.

use crate::indicators::ema;
use serde::{Deserialize, Serialize};

/// Minimum number of observations before a trend is judged at all.
pub const MIN_TREND_BARS: usize = 51;

/// EMA periods and slope lookback for the trend gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendParams {
    pub fast_period: usize,
    pub slow_period: usize,
    /// Bars over which both EMAs must have risen.
    pub lookback: usize,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            fast_period: 20,
            slow_period: 50,
            lookback: 5,
        }
    }
}

/// True iff the last close sits above a rising fast EMA which sits above a
/// rising slow EMA.
///
/// "Rising" means the EMA's last value is greater than its value `lookback`
/// bars earlier. Returns false for fewer than [`MIN_TREND_BARS`] closes or
/// misaligned series.
pub fn is_uptrend(closes: &[f64], ema_fast: &[f64], ema_slow: &[f64], lookback: usize) -> bool {
    let n = closes.len();
    if n < MIN_TREND_BARS || ema_fast.len() != n || ema_slow.len() != n || lookback >= n {
        return false;
    }

    let last = n - 1;
    let then = last - lookback;

    let stacked = closes[last] > ema_fast[last] && ema_fast[last] > ema_slow[last];
    let fast_rising = ema_fast[last] > ema_fast[then];
    let slow_rising = ema_slow[last] > ema_slow[then];

    stacked && fast_rising && slow_rising
}

/// EMA pair computed for a series, kept so the detectors can reuse it.
#[derive(Debug, Clone)]
pub struct TrendReading {
    pub uptrend: bool,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
}

/// Compute the EMA pair for `closes` and judge the trend.
pub fn classify_trend(closes: &[f64], params: &TrendParams) -> TrendReading {
    let ema_fast = ema(closes, params.fast_period);
    let ema_slow = ema(closes, params.slow_period);
    let uptrend = is_uptrend(closes, &ema_fast, &ema_slow, params.lookback);
    TrendReading {
        uptrend,
        ema_fast,
        ema_slow,
    }
}
