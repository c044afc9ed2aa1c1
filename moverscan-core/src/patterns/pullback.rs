//! Pullback to the 20 EMA.
//!
//! Price has come back to a rising fast EMA while holding above the slow
//! EMA. The stop goes under the recent swing low or just under the slow
//! EMA, whichever is tighter.

use super::{has_history, Geometry, PatternMatch};
use crate::domain::{Candle, SetupType};
use crate::indicators::{highest, lowest};
use serde::{Deserialize, Serialize};

/// Thresholds for the pullback detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullbackParams {
    /// Max distance of the close from the fast EMA, percent.
    pub ema_band_pct: f64,
    pub swing_high_bars: usize,
    pub swing_low_bars: usize,
    /// Half-width of the entry zone around the close, percent.
    pub entry_band_pct: f64,
    pub swing_stop_factor: f64,
    pub ema_stop_factor: f64,
    pub min_risk_pct: f64,
    pub max_risk_pct: f64,
}

impl Default for PullbackParams {
    fn default() -> Self {
        Self {
            ema_band_pct: 3.0,
            swing_high_bars: 20,
            swing_low_bars: 8,
            entry_band_pct: 0.5,
            swing_stop_factor: 0.99,
            ema_stop_factor: 0.98,
            min_risk_pct: 0.5,
            max_risk_pct: 15.0,
        }
    }
}

/// Detect a pullback to the fast EMA on the last candle.
///
/// Requires at least 51 candles with aligned EMA series. The entry is the
/// bottom of the entry zone; risk is measured from there.
pub fn detect_pullback_to_ema(
    candles: &[Candle],
    ema_fast: &[f64],
    ema_slow: &[f64],
    params: &PullbackParams,
) -> Option<PatternMatch> {
    if !has_history(candles, ema_fast, ema_slow) {
        return None;
    }

    let last = candles.len() - 1;
    let close = candles[last].close;
    let fast = ema_fast[last];
    let slow = ema_slow[last];

    let distance_pct = (close - fast).abs() / fast * 100.0;
    if distance_pct > params.ema_band_pct || close <= slow {
        return None;
    }

    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let swing_high = highest(&highs, params.swing_high_bars)?;
    let swing_low = lowest(&lows, params.swing_low_bars)?;

    let band = params.entry_band_pct / 100.0;
    let entry_min = close * (1.0 - band);
    let entry_max = close * (1.0 + band);
    let stop = (swing_low * params.swing_stop_factor).max(slow * params.ema_stop_factor);

    let risk_pct = (entry_min - stop) / entry_min * 100.0;
    if !(params.min_risk_pct..=params.max_risk_pct).contains(&risk_pct) {
        return None;
    }

    Some(PatternMatch {
        setup_type: SetupType::Pullback4h20Ema,
        entry: entry_min,
        entry_zone: (entry_min, entry_max),
        stop,
        risk_pct,
        geometry: Geometry::Swing {
            swing_high,
            swing_low,
        },
    })
}
