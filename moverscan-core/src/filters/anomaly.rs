//! Anomaly vetoes: late pump, parabolic move, unhealthy volume, blow-off top.
//!
//! Each check looks only at the most recent window of a series. A check that
//! lacks the history it needs does not fire, except volume health, where
//! missing context counts as unhealthy.

use crate::indicators::{mean, sma};
use serde::{Deserialize, Serialize};

// ── Late pump ────────────────────────────────────────────────────────

/// Thresholds for the daily late-pump veto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatePumpParams {
    /// Latest bar return (percent) that counts as a pump.
    pub min_return_pct: f64,
    /// Latest volume must exceed this multiple of the baseline mean.
    pub volume_multiple: f64,
    /// Bars in the volume baseline.
    pub baseline_bars: usize,
    /// Most recent bars left out of the baseline.
    pub exclude_recent: usize,
}

impl Default for LatePumpParams {
    fn default() -> Self {
        Self {
            min_return_pct: 60.0,
            volume_multiple: 10.0,
            baseline_bars: 30,
            exclude_recent: 2,
        }
    }
}

/// True iff the latest bar returned more than 60% on more than 10x the mean
/// volume of the 30 bars before the latest two.
pub fn is_late_pump(closes: &[f64], volumes: &[f64], params: &LatePumpParams) -> bool {
    let n = closes.len().min(volumes.len());
    let needed = params.baseline_bars + params.exclude_recent;
    if n < 2 || n < needed || params.baseline_bars == 0 {
        return false;
    }

    let baseline = &volumes[n - needed..n - params.exclude_recent];
    let Some(avg_volume) = mean(baseline) else {
        return false;
    };

    let prev = closes[n - 2];
    let last = closes[n - 1];
    let return_pct = (last - prev) / prev * 100.0;

    return_pct > params.min_return_pct && volumes[n - 1] > params.volume_multiple * avg_volume
}

// ── Too vertical ─────────────────────────────────────────────────────

/// Thresholds for the 4h parabolic-move veto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalParams {
    pub lookback: usize,
    pub min_consecutive: usize,
    pub min_mean_gain_pct: f64,
}

impl Default for VerticalParams {
    fn default() -> Self {
        Self {
            lookback: 8,
            min_consecutive: 6,
            min_mean_gain_pct: 3.0,
        }
    }
}

/// True iff the last `lookback` bars end in a run of at least 6 consecutive
/// up-closes whose mean gain exceeds 3%.
///
/// A flat or down close resets the run.
pub fn is_too_vertical(closes: &[f64], params: &VerticalParams) -> bool {
    let n = closes.len();
    if params.lookback == 0 || n < params.lookback + 1 {
        return false;
    }

    let mut gains: Vec<f64> = Vec::with_capacity(params.lookback);
    for i in (n - params.lookback)..n {
        let prev = closes[i - 1];
        if closes[i] > prev {
            gains.push((closes[i] - prev) / prev * 100.0);
        } else {
            gains.clear();
        }
    }

    match mean(&gains) {
        Some(avg_gain) => {
            gains.len() >= params.min_consecutive && avg_gain > params.min_mean_gain_pct
        }
        None => false,
    }
}

// ── Volume health ────────────────────────────────────────────────────

/// Thresholds for the 4h volume-health check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeHealthParams {
    /// Bars compared (up-bar vs down-bar volume).
    pub window: usize,
    /// Up-bar mean volume must exceed this fraction of down-bar mean volume.
    pub up_down_ratio: f64,
    /// Period of the volume SMA that provides context.
    pub sma_period: usize,
}

impl Default for VolumeHealthParams {
    fn default() -> Self {
        Self {
            window: 10,
            up_down_ratio: 0.8,
            sma_period: 20,
        }
    }
}

/// Outcome of the volume-health check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeHealth {
    pub healthy: bool,
    /// Mean volume of up-bars in the window (0 when there are none).
    pub up_volume: f64,
    /// Mean volume of down-bars in the window (0 when there are none).
    pub down_volume: f64,
    /// Last volume relative to its SMA; NaN when the SMA is unavailable.
    pub relative_volume: f64,
}

impl VolumeHealth {
    fn insufficient() -> Self {
        Self {
            healthy: false,
            up_volume: 0.0,
            down_volume: 0.0,
            relative_volume: f64::NAN,
        }
    }
}

/// Compare mean volume on up-bars against down-bars over the last 10 bars.
///
/// Healthy iff `up_mean > 0.8 * down_mean`. Fewer bars than the volume SMA
/// period (or than the window plus one) is reported as unhealthy.
pub fn check_volume_health(
    volumes: &[f64],
    closes: &[f64],
    params: &VolumeHealthParams,
) -> VolumeHealth {
    let n = closes.len().min(volumes.len());
    if params.window == 0 || n < params.sma_period.max(params.window + 1) {
        return VolumeHealth::insufficient();
    }

    let vol_sma = sma(&volumes[..n], params.sma_period);
    let relative_volume = match vol_sma.last() {
        Some(&avg) if avg > 0.0 => volumes[n - 1] / avg,
        _ => f64::NAN,
    };

    let mut up = Vec::with_capacity(params.window);
    let mut down = Vec::with_capacity(params.window);
    for i in (n - params.window)..n {
        if closes[i] > closes[i - 1] {
            up.push(volumes[i]);
        } else if closes[i] < closes[i - 1] {
            down.push(volumes[i]);
        }
    }

    let up_volume = mean(&up).unwrap_or(0.0);
    let down_volume = mean(&down).unwrap_or(0.0);

    VolumeHealth {
        healthy: up_volume > params.up_down_ratio * down_volume,
        up_volume,
        down_volume,
        relative_volume,
    }
}

// ── Blow-off top ─────────────────────────────────────────────────────

/// Thresholds for the 4h blow-off-top veto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlowOffParams {
    /// Most recent bars scanned for a spike.
    pub scan_bars: usize,
    /// Spike bar return (percent).
    pub min_return_pct: f64,
    /// Spike volume must exceed this multiple of its volume SMA.
    pub volume_multiple: f64,
    pub sma_period: usize,
    /// Bars after the spike whose closes are averaged.
    pub follow_bars: usize,
    /// Average follow-through close must sit this far (percent) below the spike close.
    pub reversal_pct: f64,
}

impl Default for BlowOffParams {
    fn default() -> Self {
        Self {
            scan_bars: 4,
            min_return_pct: 30.0,
            volume_multiple: 8.0,
            sma_period: 20,
            follow_bars: 3,
            reversal_pct: 5.0,
        }
    }
}

/// True iff one of the last 4 bars spiked more than 30% on more than 8x its
/// 20-bar volume SMA and the following (up to 3) bars average a close at
/// least 5% below the spike close.
///
/// A spike on the very last bar has no follow-through yet and does not fire.
pub fn is_blow_off_top(closes: &[f64], volumes: &[f64], params: &BlowOffParams) -> bool {
    let n = closes.len().min(volumes.len());
    if n < 2 {
        return false;
    }

    let vol_sma = sma(&volumes[..n], params.sma_period);
    let start = n.saturating_sub(params.scan_bars).max(1);

    for i in start..n {
        let prev = closes[i - 1];
        let return_pct = (closes[i] - prev) / prev * 100.0;
        let avg_volume = vol_sma[i];
        if return_pct <= params.min_return_pct
            || avg_volume.is_nan()
            || volumes[i] <= params.volume_multiple * avg_volume
        {
            continue;
        }

        let follow_end = (i + 1 + params.follow_bars).min(n);
        if let Some(avg_close) = mean(&closes[i + 1..follow_end]) {
            if avg_close <= closes[i] * (1.0 - params.reversal_pct / 100.0) {
                return true;
            }
        }
    }

    false
}
