//! Setup detection on the 4h series.
//!
//! Two detectors, tried in priority order:
//! 1. Pullback to the rising 20 EMA (`pullback_4h_20ema`)
//! 2. Breakout from a tight consolidation range (`breakout_4h_range`)
//!
//! Detectors only run after every veto has passed. Each returns a
//! [`PatternMatch`] with entry/stop geometry, or None. A match always has
//! `entry > stop` and a risk percentage inside the detector's bounds.

pub mod breakout;
pub mod pullback;

pub use breakout::{detect_breakout_range, BreakoutParams};
pub use pullback::{detect_pullback_to_ema, PullbackParams};

use crate::domain::{Candle, SetupType};
use serde::{Deserialize, Serialize};

/// Minimum 4h history either detector needs.
pub const MIN_PATTERN_BARS: usize = 51;

/// Pattern-specific reference levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    /// Recent swing extremes around a pullback.
    Swing { swing_high: f64, swing_low: f64 },
    /// Bounds of the consolidation before a breakout.
    Range { range_high: f64, range_low: f64 },
}

/// A detected pattern with its trade geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatternMatch {
    pub setup_type: SetupType,
    pub entry: f64,
    pub entry_zone: (f64, f64),
    pub stop: f64,
    /// (entry - stop) / entry * 100
    pub risk_pct: f64,
    pub geometry: Geometry,
}

impl PatternMatch {
    /// Positive risk with the stop under the entry.
    pub fn is_usable(&self) -> bool {
        self.risk_pct > 0.0 && self.entry > self.stop
    }
}

/// Parameters for both detectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternParams {
    pub pullback: PullbackParams,
    pub breakout: BreakoutParams,
}

/// Run the detectors in priority order and return the first usable match.
pub fn detect_setup(
    candles: &[Candle],
    ema_fast: &[f64],
    ema_slow: &[f64],
    params: &PatternParams,
) -> Option<PatternMatch> {
    detect_pullback_to_ema(candles, ema_fast, ema_slow, &params.pullback)
        .filter(PatternMatch::is_usable)
        .or_else(|| {
            detect_breakout_range(candles, ema_fast, ema_slow, &params.breakout)
                .filter(PatternMatch::is_usable)
        })
}

/// Shared precondition: enough aligned history for a decision on the last bar.
fn has_history(candles: &[Candle], ema_fast: &[f64], ema_slow: &[f64]) -> bool {
    let n = candles.len();
    n >= MIN_PATTERN_BARS && ema_fast.len() == n && ema_slow.len() == n
}
