//! Gates a candidate must pass before pattern detection.
//!
//! Trend gates must pass (daily, then 4h). Anomaly checks are vetoes: any
//! one of them firing disqualifies the candidate at that stage.

pub mod anomaly;
pub mod trend;

pub use anomaly::{
    check_volume_health, is_blow_off_top, is_late_pump, is_too_vertical, BlowOffParams,
    LatePumpParams, VerticalParams, VolumeHealth, VolumeHealthParams,
};
pub use trend::{classify_trend, is_uptrend, TrendParams, TrendReading, MIN_TREND_BARS};

use serde::Serialize;
use std::fmt;

/// The gate that rejected a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    DailyTrend,
    LatePump,
    IntradayTrend,
    TooVertical,
    VolumeHealth,
    BlowOffTop,
}

impl Gate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DailyTrend => "daily_trend",
            Self::LatePump => "late_pump",
            Self::IntradayTrend => "intraday_trend",
            Self::TooVertical => "too_vertical",
            Self::VolumeHealth => "volume_health",
            Self::BlowOffTop => "blow_off_top",
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
