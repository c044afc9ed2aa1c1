//! Setup — a risk-bounded long entry produced by a scan.

use super::Candidate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which detector produced the setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetupType {
    #[serde(rename = "pullback_4h_20ema")]
    Pullback4h20Ema,
    #[serde(rename = "breakout_4h_range")]
    Breakout4hRange,
}

impl SetupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pullback4h20Ema => "pullback_4h_20ema",
            Self::Breakout4hRange => "breakout_4h_range",
        }
    }
}

impl fmt::Display for SetupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playbook the setup is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyLabel {
    #[serde(rename = "New Baseline")]
    NewBaseline,
    #[serde(rename = "Monk Mode")]
    MonkMode,
    #[serde(rename = "Situational Awareness")]
    SituationalAwareness,
}

impl StrategyLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewBaseline => "New Baseline",
            Self::MonkMode => "Monk Mode",
            Self::SituationalAwareness => "Situational Awareness",
        }
    }
}

impl fmt::Display for StrategyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trade setup ready for review.
///
/// `position_size_usd = account_size * risk_fraction / (entry - stop)`,
/// and `entry > stop` always holds for a constructed setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    pub symbol: String,
    pub coin_name: String,
    pub setup_type: SetupType,
    pub strategy_label: StrategyLabel,
    pub timeframe: String,
    pub entry_zone: (f64, f64),
    pub entry: f64,
    pub stop: f64,
    /// Distance from entry to stop, in percent of entry.
    pub risk_pct: f64,
    pub position_size_usd: f64,
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
    pub change_24h: f64,
}

/// Output of one scan invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub setups: Vec<Setup>,
    /// Movers that passed the change/volume filter, in feed order.
    pub candidates: Vec<Candidate>,
    /// The full movers feed as received.
    pub top_movers: Vec<Candidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&SetupType::Pullback4h20Ema).unwrap(),
            "\"pullback_4h_20ema\""
        );
        assert_eq!(
            serde_json::to_string(&SetupType::Breakout4hRange).unwrap(),
            "\"breakout_4h_range\""
        );
    }

    #[test]
    fn strategy_label_wire_names() {
        assert_eq!(
            serde_json::to_string(&StrategyLabel::NewBaseline).unwrap(),
            "\"New Baseline\""
        );
        assert_eq!(
            serde_json::to_string(&StrategyLabel::SituationalAwareness).unwrap(),
            "\"Situational Awareness\""
        );
        assert_eq!(StrategyLabel::MonkMode.to_string(), "Monk Mode");
    }

    #[test]
    fn scan_result_uses_top_movers_key() {
        let json = serde_json::to_value(ScanResult::default()).unwrap();
        assert!(json.get("topMovers").is_some());
        assert!(json.get("setups").is_some());
        assert!(json.get("candidates").is_some());
    }
}
