//! Collaborator traits and structured error types.
//!
//! `MoversProvider` abstracts the top-movers feed and `ExchangeProvider`
//! the exchange (tradable universe and klines) so the scanner can run
//! against fixtures in tests and the real HTTP clients in production.

use crate::domain::{Candle, Instrument, Mover};
use thiserror::Error;

/// Errors from a data collaborator.
///
/// Displayable as-is in CLI output and log lines.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Whether a later attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::NetworkUnreachable(_) | DataError::RateLimited { .. } => true,
            DataError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Feed of the day's biggest movers.
pub trait MoversProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Movers for a timeframe (e.g. "24h"), in the feed's own order.
    fn fetch_top_movers(&self, timeframe: &str) -> Result<Vec<Mover>, DataError>;
}

/// Spot exchange: listed instruments and klines.
pub trait ExchangeProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Every listed instrument, whatever its status.
    fn fetch_tradable_universe(&self) -> Result<Vec<Instrument>, DataError>;

    /// Up to `limit` most recent candles for `pair`, oldest first.
    fn fetch_candles(
        &self,
        pair: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError>;
}
