//! Fixed-risk position sizer.
//!
//! Position size from a fixed dollar risk budget and the stop distance.
//!
//! # Formula
//! ```text
//! risk_dollars   = account_size * risk_fraction
//! risk_per_unit  = entry - stop
//! position_size  = risk_dollars / risk_per_unit
//! ```
//!
//! # Example
//! - Account: $10,000, risk 2% ($200)
//! - Entry $100, stop $95 (risk per unit $5)
//! - Size: $200 / $5 = 40

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    #[error("account size must be positive and finite, got {0}")]
    InvalidAccountSize(f64),
    #[error("risk fraction must be in (0, 1), got {0}")]
    InvalidRiskFraction(f64),
}

/// Position size for a long trade, or None when `entry <= stop` or any
/// input is not finite.
pub fn position_size_usd(
    account_size_usd: f64,
    risk_fraction: f64,
    entry: f64,
    stop: f64,
) -> Option<f64> {
    if ![account_size_usd, risk_fraction, entry, stop]
        .iter()
        .all(|v| v.is_finite())
    {
        return None;
    }

    let risk_per_unit = entry - stop;
    if risk_per_unit <= 0.0 {
        return None;
    }

    Some((account_size_usd * risk_fraction) / risk_per_unit)
}

/// Risk budget for one scan: account size and fraction risked per trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskSizer {
    account_size_usd: f64,
    risk_fraction: f64,
}

impl RiskSizer {
    pub fn new(account_size_usd: f64, risk_fraction: f64) -> Result<Self, SizingError> {
        if !account_size_usd.is_finite() || account_size_usd <= 0.0 {
            return Err(SizingError::InvalidAccountSize(account_size_usd));
        }
        if !risk_fraction.is_finite() || risk_fraction <= 0.0 || risk_fraction >= 1.0 {
            return Err(SizingError::InvalidRiskFraction(risk_fraction));
        }
        Ok(Self {
            account_size_usd,
            risk_fraction,
        })
    }

    /// Dollars at risk per trade.
    pub fn risk_budget_usd(&self) -> f64 {
        self.account_size_usd * self.risk_fraction
    }

    pub fn size(&self, entry: f64, stop: f64) -> Option<f64> {
        position_size_usd(self.account_size_usd, self.risk_fraction, entry, stop)
    }
}
