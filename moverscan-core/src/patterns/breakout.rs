//! Breakout from a tight consolidation range.
//!
//! The 15 bars before the current one form the range. With the EMAs in
//! bullish order and the close pressing against the range high, the entry
//! sits just above the range and the stop just below it.

use super::{has_history, Geometry, PatternMatch};
use crate::domain::{Candle, SetupType};
use crate::indicators::{highest, lowest};
use serde::{Deserialize, Serialize};

/// Thresholds for the breakout detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutParams {
    /// Bars preceding the current one that form the range.
    pub range_bars: usize,
    pub min_range_pct: f64,
    pub max_range_pct: f64,
    /// Max distance of the close from the range high, percent.
    pub proximity_pct: f64,
    pub entry_factor: f64,
    pub stop_factor: f64,
    pub min_risk_pct: f64,
    pub max_risk_pct: f64,
}

impl Default for BreakoutParams {
    fn default() -> Self {
        Self {
            range_bars: 15,
            min_range_pct: 3.0,
            max_range_pct: 12.0,
            proximity_pct: 2.0,
            entry_factor: 1.005,
            stop_factor: 0.99,
            min_risk_pct: 1.0,
            max_risk_pct: 15.0,
        }
    }
}

/// Detect a range breakout on the last candle.
///
/// Returns None unless the fast EMA is above the slow EMA on the last bar,
/// however tight the range is.
pub fn detect_breakout_range(
    candles: &[Candle],
    ema_fast: &[f64],
    ema_slow: &[f64],
    params: &BreakoutParams,
) -> Option<PatternMatch> {
    if !has_history(candles, ema_fast, ema_slow) {
        return None;
    }

    let last = candles.len() - 1;
    if ema_fast[last] <= ema_slow[last] {
        return None;
    }

    // Range excludes the current bar
    let prior = &candles[..last];
    let highs: Vec<f64> = prior.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = prior.iter().map(|c| c.low).collect();
    let range_high = highest(&highs, params.range_bars)?;
    let range_low = lowest(&lows, params.range_bars)?;
    if range_low <= 0.0 {
        return None;
    }

    let range_pct = (range_high - range_low) / range_low * 100.0;
    if !(params.min_range_pct..=params.max_range_pct).contains(&range_pct) {
        return None;
    }

    let close = candles[last].close;
    let proximity = (close - range_high).abs() / range_high * 100.0;
    if proximity > params.proximity_pct {
        return None;
    }

    let entry = range_high * params.entry_factor;
    let stop = range_low * params.stop_factor;
    let risk_pct = (entry - stop) / entry * 100.0;
    if !(params.min_risk_pct..=params.max_risk_pct).contains(&risk_pct) {
        return None;
    }

    Some(PatternMatch {
        setup_type: SetupType::Breakout4hRange,
        entry,
        entry_zone: (range_high, entry),
        stop,
        risk_pct,
        geometry: Geometry::Range {
            range_high,
            range_low,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::fixtures::candles;

    /// 60 candles closing at `close`, with the 15 bars before the last
    /// spanning [low, high].
    fn ranged(close: f64, high: f64, low: f64) -> Vec<Candle> {
        let mut bars = candles(60, close, close + 0.5, close - 0.5);
        let n = bars.len();
        for b in &mut bars[n - 16..n - 1] {
            b.high = high;
            b.low = low;
        }
        bars
    }

    #[test]
    fn detects_breakout_with_expected_geometry() {
        let bars = ranged(104.0, 105.0, 100.0);
        let fast = vec![101.0; 60];
        let slow = vec![100.0; 60];

        let m = detect_breakout_range(&bars, &fast, &slow, &BreakoutParams::default()).unwrap();
        assert_eq!(m.setup_type, SetupType::Breakout4hRange);
        assert!((m.entry - 105.525).abs() < 1e-9);
        assert!((m.stop - 99.0).abs() < 1e-9);
        assert!((m.risk_pct - (105.525 - 99.0) / 105.525 * 100.0).abs() < 1e-9);
        assert_eq!(m.entry_zone.0, 105.0);
        assert_eq!(
            m.geometry,
            Geometry::Range {
                range_high: 105.0,
                range_low: 100.0
            }
        );
    }

    #[test]
    fn bearish_ema_order_vetoes() {
        let bars = ranged(104.0, 105.0, 100.0);
        let fast = vec![100.0; 60];
        let slow = vec![100.0; 60];
        assert!(detect_breakout_range(&bars, &fast, &slow, &BreakoutParams::default()).is_none());
    }

    #[test]
    fn range_too_tight_or_too_wide() {
        let fast = vec![101.0; 60];
        let slow = vec![100.0; 60];
        // 2% range
        let bars = ranged(104.0, 104.0, 101.96);
        assert!(detect_breakout_range(&bars, &fast, &slow, &BreakoutParams::default()).is_none());
        // 15% range
        let bars = ranged(115.0, 115.0, 100.0);
        assert!(detect_breakout_range(&bars, &fast, &slow, &BreakoutParams::default()).is_none());
    }

    #[test]
    fn close_must_press_the_range_high() {
        let fast = vec![101.0; 60];
        let slow = vec![100.0; 60];
        // 102 is 2.86% under 105
        let bars = ranged(102.0, 105.0, 100.0);
        assert!(detect_breakout_range(&bars, &fast, &slow, &BreakoutParams::default()).is_none());
    }

    #[test]
    fn current_bar_is_not_part_of_the_range() {
        let fast = vec![101.0; 60];
        let slow = vec![100.0; 60];
        let mut bars = ranged(104.0, 105.0, 100.0);
        let last = bars.len() - 1;
        bars[last].high = 150.0;
        bars[last].low = 50.0;
        let m = detect_breakout_range(&bars, &fast, &slow, &BreakoutParams::default()).unwrap();
        assert!(matches!(m.geometry, Geometry::Range { range_high, .. } if range_high == 105.0));
    }

    #[test]
    fn needs_fifty_one_bars() {
        let bars: Vec<Candle> = ranged(104.0, 105.0, 100.0)[10..].to_vec();
        let fast = vec![101.0; 50];
        let slow = vec![100.0; 50];
        assert!(detect_breakout_range(&bars, &fast, &slow, &BreakoutParams::default()).is_none());
    }
}
