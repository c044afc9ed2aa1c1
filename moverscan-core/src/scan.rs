//! Scan orchestrator.
//!
//! One scan:
//!
//! ```text
//! fetch movers ∥ symbol index ensure_fresh
//!   → filter candidates (change/volume, feed order, capped)
//!   → per candidate, sequentially and rate limited:
//!       resolve pair → daily candles → daily trend → late pump
//!       → 4h candles → 4h trend → too vertical → volume health → blow-off
//!       → detect setup → size → label + reasoning
//!   → ScanResult
//! ```
//!
//! A failed gate or a missing pattern skips the candidate. Errors while
//! evaluating a candidate are logged and skipped too; only the bootstrap
//! (movers feed, symbol universe with nothing cached) fails the whole scan.

use crate::clock::{Clock, Sleeper, SystemClock, ThreadSleeper};
use crate::config::{FilterConfig, ScanConfig};
use crate::data::{self, DataError, ExchangeProvider, MoversProvider, SymbolIndex};
use crate::domain::{Candidate, Candle, CandleColumns, ScanResult, Setup};
use crate::filters::{
    check_volume_health, classify_trend, is_blow_off_top, is_late_pump, is_too_vertical, Gate,
    MIN_TREND_BARS,
};
use crate::patterns::{detect_setup, MIN_PATTERN_BARS};
use crate::rate_limit::{FixedIntervalLimiter, RateLimiter};
use crate::reasoning::{RandomReasoning, ReasoningContext, ReasoningFormatter, SeededReasoning};
use crate::sizing::{strategy_label, RiskSizer};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Fatal: the scan produced no result.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("movers feed failed: {0}")]
    Movers(#[source] DataError),
    #[error("symbol universe unavailable: {0}")]
    SymbolIndex(#[source] DataError),
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Recovered per candidate: logged, then the next candidate is tried.
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("no tradable pair for '{asset}'")]
    SymbolNotFound { asset: String },
    #[error("need {needed} {interval} candles, got {got}")]
    DataInsufficient {
        interval: String,
        needed: usize,
        got: usize,
    },
    #[error("external API: {0}")]
    ExternalApi(#[source] DataError),
}

impl From<DataError> for CandidateError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::SymbolNotFound { symbol } => CandidateError::SymbolNotFound { asset: symbol },
            other => CandidateError::ExternalApi(other),
        }
    }
}

/// Why a candidate produced no setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Gate(Gate),
    NoPattern,
    /// Entry/stop geometry the sizer refuses.
    Unsizable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Gate(gate) => write!(f, "gate:{gate}"),
            SkipReason::NoPattern => f.write_str("no_pattern"),
            SkipReason::Unsizable => f.write_str("unsizable"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CandidateOutcome {
    Setup(Setup),
    Skipped(SkipReason),
}

/// Keep movers within the change band with enough volume, in feed order,
/// capped at `max_candidates`.
pub fn filter_candidates(movers: &[Candidate], filter: &FilterConfig) -> Vec<Candidate> {
    movers
        .iter()
        .filter(|c| {
            c.change_24h >= filter.min_change_pct
                && c.change_24h <= filter.max_change_pct
                && c.vol_24h_usd >= filter.min_volume_usd
        })
        .take(filter.max_candidates)
        .cloned()
        .collect()
}

pub struct Scanner {
    config: ScanConfig,
    movers: Arc<dyn MoversProvider>,
    exchange: Arc<dyn ExchangeProvider>,
    index: Arc<SymbolIndex>,
    limiter: Arc<dyn RateLimiter>,
    reasoning: Arc<dyn ReasoningFormatter>,
    clock: Arc<dyn Clock>,
}

impl Scanner {
    /// Wire a scanner from config. The symbol index, the fixed-interval
    /// limiter and the reasoning formatter are derived from `config`.
    pub fn new(
        config: ScanConfig,
        movers: Arc<dyn MoversProvider>,
        exchange: Arc<dyn ExchangeProvider>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let index = SymbolIndex::new(exchange.clone(), clock.clone())
            .with_quote_asset(config.data.quote_asset.clone())
            .with_ttl(config.data.symbol_ttl());
        let limiter =
            FixedIntervalLimiter::new(config.data.candidate_delay(), clock.clone(), sleeper);
        let reasoning: Arc<dyn ReasoningFormatter> = match config.reasoning.seed {
            Some(seed) => Arc::new(SeededReasoning::new(seed)),
            None => Arc::new(RandomReasoning),
        };

        Self {
            config,
            movers,
            exchange,
            index: Arc::new(index),
            limiter: Arc::new(limiter),
            reasoning,
            clock,
        }
    }

    /// Scanner against CoinGecko and Binance on the system clock.
    pub fn live(config: ScanConfig) -> Result<Self, DataError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let sleeper: Arc<dyn Sleeper> = Arc::new(ThreadSleeper);
        let providers = data::live_providers(&config.data, clock.clone(), sleeper.clone())?;
        Ok(Self::new(
            config,
            providers.movers,
            providers.exchange,
            clock,
            sleeper,
        ))
    }

    /// Share a symbol index across scanners.
    pub fn with_symbol_index(mut self, index: Arc<SymbolIndex>) -> Self {
        self.index = index;
        self
    }

    pub fn with_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_reasoning(mut self, reasoning: Arc<dyn ReasoningFormatter>) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn symbol_index(&self) -> &Arc<SymbolIndex> {
        &self.index
    }

    /// Run one scan.
    ///
    /// `risk_fraction` is the share of the account risked per setup
    /// (0.02 = 2%).
    pub fn run_scan(
        &self,
        account_size_usd: f64,
        risk_fraction: f64,
    ) -> Result<ScanResult, ScanError> {
        let sizer = RiskSizer::new(account_size_usd, risk_fraction)
            .map_err(|e| ScanError::InvalidParameters(e.to_string()))?;

        let timeframe = self.config.filter.movers_timeframe.as_str();
        let (movers, universe) = rayon::join(
            || self.movers.fetch_top_movers(timeframe),
            || self.index.ensure_fresh(),
        );
        let movers = movers.map_err(ScanError::Movers)?;
        let pairs = universe.map_err(ScanError::SymbolIndex)?;

        let top_movers: Vec<Candidate> = movers.into_iter().map(Candidate::from).collect();
        let candidates = filter_candidates(&top_movers, &self.config.filter);
        tracing::info!(
            movers = top_movers.len(),
            candidates = candidates.len(),
            pairs,
            risk_budget_usd = sizer.risk_budget_usd(),
            "scan started"
        );

        let mut setups = Vec::new();
        let mut skipped = 0usize;
        let mut failed = 0usize;

        for candidate in &candidates {
            self.limiter.acquire();
            match self.evaluate(candidate, &sizer) {
                Ok(CandidateOutcome::Setup(setup)) => {
                    tracing::info!(
                        symbol = %setup.symbol,
                        setup_type = %setup.setup_type,
                        label = %setup.strategy_label,
                        entry = setup.entry,
                        stop = setup.stop,
                        risk_pct = setup.risk_pct,
                        "setup found"
                    );
                    setups.push(setup);
                }
                Ok(CandidateOutcome::Skipped(reason)) => {
                    tracing::debug!(symbol = %candidate.symbol, %reason, "candidate skipped");
                    skipped += 1;
                }
                Err(err) => {
                    tracing::warn!(symbol = %candidate.symbol, error = %err, "candidate failed");
                    failed += 1;
                }
            }
        }

        tracing::info!(
            setups = setups.len(),
            skipped,
            failed,
            "scan finished"
        );

        Ok(ScanResult {
            setups,
            candidates,
            top_movers,
        })
    }

    /// Walk one candidate through the gates.
    pub fn evaluate(
        &self,
        candidate: &Candidate,
        sizer: &RiskSizer,
    ) -> Result<CandidateOutcome, CandidateError> {
        use CandidateOutcome::Skipped;
        use SkipReason::Gate as Vetoed;

        let pair = self
            .index
            .resolve(&candidate.symbol)
            .map_err(|_| CandidateError::SymbolNotFound {
                asset: candidate.symbol.clone(),
            })?;

        let data = &self.config.data;
        let vetoes = &self.config.vetoes;

        // Daily
        let daily = self.fetch(&pair, &data.daily_interval, data.daily_limit, MIN_TREND_BARS)?;
        let cols = CandleColumns::from_candles(&daily);
        if !classify_trend(&cols.closes, &self.config.trend).uptrend {
            return Ok(Skipped(Vetoed(Gate::DailyTrend)));
        }
        if is_late_pump(&cols.closes, &cols.volumes, &vetoes.late_pump) {
            return Ok(Skipped(Vetoed(Gate::LatePump)));
        }

        // 4h
        let intraday = self.fetch(
            &pair,
            &data.intraday_interval,
            data.intraday_limit,
            MIN_TREND_BARS.max(MIN_PATTERN_BARS),
        )?;
        let cols = CandleColumns::from_candles(&intraday);
        let trend = classify_trend(&cols.closes, &self.config.trend);
        if !trend.uptrend {
            return Ok(Skipped(Vetoed(Gate::IntradayTrend)));
        }
        if is_too_vertical(&cols.closes, &vetoes.vertical) {
            return Ok(Skipped(Vetoed(Gate::TooVertical)));
        }
        if !check_volume_health(&cols.volumes, &cols.closes, &vetoes.volume_health).healthy {
            return Ok(Skipped(Vetoed(Gate::VolumeHealth)));
        }
        if is_blow_off_top(&cols.closes, &cols.volumes, &vetoes.blow_off) {
            return Ok(Skipped(Vetoed(Gate::BlowOffTop)));
        }

        let Some(pattern) = detect_setup(
            &intraday,
            &trend.ema_fast,
            &trend.ema_slow,
            &self.config.patterns(),
        ) else {
            return Ok(Skipped(SkipReason::NoPattern));
        };

        let Some(position_size_usd) = sizer.size(pattern.entry, pattern.stop) else {
            return Ok(Skipped(SkipReason::Unsizable));
        };

        let reasoning = self.reasoning.explain(&ReasoningContext {
            symbol: &pair,
            setup_type: pattern.setup_type,
            entry: pattern.entry,
            stop: pattern.stop,
            risk_pct: pattern.risk_pct,
        });

        Ok(CandidateOutcome::Setup(Setup {
            symbol: pair,
            coin_name: candidate.name.clone(),
            setup_type: pattern.setup_type,
            strategy_label: strategy_label(
                pattern.setup_type,
                pattern.risk_pct,
                candidate.change_24h,
            ),
            timeframe: data.intraday_interval.clone(),
            entry_zone: pattern.entry_zone,
            entry: pattern.entry,
            stop: pattern.stop,
            risk_pct: pattern.risk_pct,
            position_size_usd,
            reasoning,
            timestamp: self.clock.now(),
            change_24h: candidate.change_24h,
        }))
    }

    fn fetch(
        &self,
        pair: &str,
        interval: &str,
        limit: usize,
        needed: usize,
    ) -> Result<Vec<Candle>, CandidateError> {
        let candles = self.exchange.fetch_candles(pair, interval, limit)?;
        if let Some(bad) = candles.iter().find(|c| !c.is_sane()) {
            return Err(CandidateError::ExternalApi(DataError::ResponseFormatChanged(
                format!("malformed {interval} candle at {}", bad.open_time),
            )));
        }
        if candles.len() < needed {
            return Err(CandidateError::DataInsufficient {
                interval: interval.to_string(),
                needed,
                got: candles.len(),
            });
        }
        Ok(candles)
    }
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("movers", &self.movers.name())
            .field("exchange", &self.exchange.name())
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
