//! Scan configuration.
//!
//! Every section has `#[serde(default)]`, so a TOML file only needs to name
//! what it overrides:
//!
//! ```toml
//! [filter]
//! max_candidates = 10
//!
//! [vetoes.late_pump]
//! min_return_pct = 80.0
//!
//! [reasoning]
//! seed = 42
//! ```

use crate::data::coingecko::MOVERS_TIMEFRAME;
use crate::filters::{
    BlowOffParams, LatePumpParams, TrendParams, VerticalParams, VolumeHealthParams,
    MIN_TREND_BARS,
};
use crate::patterns::{BreakoutParams, PatternParams, PullbackParams, MIN_PATTERN_BARS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub filter: FilterConfig,
    pub data: DataConfig,
    pub trend: TrendParams,
    pub vetoes: VetoConfig,
    pub pullback: PullbackParams,
    pub breakout: BreakoutParams,
    pub reasoning: ReasoningConfig,
}

/// Which movers become candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_change_pct: f64,
    pub max_change_pct: f64,
    pub min_volume_usd: f64,
    pub max_candidates: usize,
    /// Timeframe passed to the movers feed.
    pub movers_timeframe: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_change_pct: 10.0,
            max_change_pct: 200.0,
            min_volume_usd: 1_000_000.0,
            max_candidates: 30,
            movers_timeframe: "24h".to_string(),
        }
    }
}

/// Provider endpoints, intervals and pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub quote_asset: String,
    pub symbol_ttl_secs: u64,
    pub daily_interval: String,
    pub daily_limit: usize,
    pub intraday_interval: String,
    pub intraday_limit: usize,
    /// Minimum spacing between candidates.
    pub candidate_delay_ms: u64,
    pub http_timeout_secs: u64,
    pub breaker_cooldown_secs: u64,
    pub binance_url: String,
    pub coingecko_url: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            quote_asset: "USDT".to_string(),
            symbol_ttl_secs: 60 * 60,
            daily_interval: "1d".to_string(),
            daily_limit: 100,
            intraday_interval: "4h".to_string(),
            intraday_limit: 100,
            candidate_delay_ms: 300,
            http_timeout_secs: 30,
            breaker_cooldown_secs: 5 * 60,
            binance_url: crate::data::binance::DEFAULT_BASE_URL.to_string(),
            coingecko_url: crate::data::coingecko::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl DataConfig {
    pub fn symbol_ttl(&self) -> Duration {
        Duration::from_secs(self.symbol_ttl_secs)
    }

    pub fn candidate_delay(&self) -> Duration {
        Duration::from_millis(self.candidate_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.breaker_cooldown_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VetoConfig {
    pub late_pump: LatePumpParams,
    pub vertical: VerticalParams,
    pub volume_health: VolumeHealthParams,
    pub blow_off: BlowOffParams,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Deterministic reasoning text when set.
    pub seed: Option<u64>,
}

impl ScanConfig {
    /// Load and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(format!("serialize: {e}")))
    }

    pub fn patterns(&self) -> PatternParams {
        PatternParams {
            pullback: self.pullback,
            breakout: self.breakout,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.filter;
        if f.min_change_pct.is_nan()
            || f.max_change_pct.is_nan()
            || f.min_change_pct > f.max_change_pct
        {
            return Err(ConfigError::Invalid(format!(
                "filter.min_change_pct ({}) exceeds filter.max_change_pct ({})",
                f.min_change_pct, f.max_change_pct
            )));
        }
        if f.min_volume_usd.is_nan() || f.min_volume_usd < 0.0 {
            return Err(ConfigError::Invalid(
                "filter.min_volume_usd must be non-negative".into(),
            ));
        }
        if f.max_candidates == 0 {
            return Err(ConfigError::Invalid("filter.max_candidates must be > 0".into()));
        }
        if f.movers_timeframe != MOVERS_TIMEFRAME {
            return Err(ConfigError::Invalid(format!(
                "filter.movers_timeframe must be \"{MOVERS_TIMEFRAME}\", got \"{}\"",
                f.movers_timeframe
            )));
        }

        let d = &self.data;
        if d.quote_asset.trim().is_empty() {
            return Err(ConfigError::Invalid("data.quote_asset is empty".into()));
        }
        if d.daily_limit < MIN_TREND_BARS {
            return Err(ConfigError::Invalid(format!(
                "data.daily_limit must be at least {MIN_TREND_BARS}, got {}",
                d.daily_limit
            )));
        }
        let intraday_min = MIN_TREND_BARS.max(MIN_PATTERN_BARS);
        if d.intraday_limit < intraday_min {
            return Err(ConfigError::Invalid(format!(
                "data.intraday_limit must be at least {intraday_min}, got {}",
                d.intraday_limit
            )));
        }
        if d.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid("data.http_timeout_secs must be > 0".into()));
        }

        let t = &self.trend;
        if t.fast_period == 0 || t.fast_period >= t.slow_period {
            return Err(ConfigError::Invalid(format!(
                "trend.fast_period ({}) must be positive and below trend.slow_period ({})",
                t.fast_period, t.slow_period
            )));
        }

        for (name, lo, hi) in [
            ("pullback", self.pullback.min_risk_pct, self.pullback.max_risk_pct),
            ("breakout", self.breakout.min_risk_pct, self.breakout.max_risk_pct),
        ] {
            if lo.is_nan() || hi.is_nan() || lo <= 0.0 || lo > hi {
                return Err(ConfigError::Invalid(format!(
                    "{name} risk bounds must satisfy 0 < min <= max, got [{lo}, {hi}]"
                )));
            }
        }

        Ok(())
    }
}
