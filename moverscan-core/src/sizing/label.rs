//! Strategy labels — a fixed decision table over setup type, risk and 24h change.

use crate::domain::{SetupType, StrategyLabel};

/// Label a setup.
///
/// | setup    | condition                        | label                  |
/// |----------|----------------------------------|------------------------|
/// | pullback | risk <= 2% and change < 30%      | New Baseline           |
/// | pullback | change > 50%                     | Situational Awareness  |
/// | pullback | otherwise                        | Monk Mode              |
/// | breakout | risk <= 2.5%                     | New Baseline           |
/// | breakout | otherwise                        | Situational Awareness  |
///
/// `risk_pct` and `change_24h` are both in percent.
pub fn strategy_label(setup_type: SetupType, risk_pct: f64, change_24h: f64) -> StrategyLabel {
    match setup_type {
        SetupType::Pullback4h20Ema => {
            if risk_pct <= 2.0 && change_24h < 30.0 {
                StrategyLabel::NewBaseline
            } else if change_24h > 50.0 {
                StrategyLabel::SituationalAwareness
            } else {
                StrategyLabel::MonkMode
            }
        }
        SetupType::Breakout4hRange => {
            if risk_pct <= 2.5 {
                StrategyLabel::NewBaseline
            } else {
                StrategyLabel::SituationalAwareness
            }
        }
    }
}
