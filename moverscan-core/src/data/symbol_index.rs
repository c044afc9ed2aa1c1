//! Mapping from feed asset codes to exchange trading pairs.
//!
//! The index caches the set of pairs that are trading against the quote
//! asset. It is refreshed at most once per TTL; a failed refresh keeps the
//! previous snapshot so a flaky exchange endpoint does not take the whole
//! scan down.
//!
//! # Concurrency
//! The snapshot sits behind a `RwLock`. `refresh` performs the network call
//! without holding the lock and swaps the snapshot in afterwards, so two
//! concurrent refreshes both fetch and the last writer wins.

use super::provider::{DataError, ExchangeProvider};
use crate::clock::{elapsed_between, Clock};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no tradable pair for asset '{asset}'")]
    NotFound { asset: String },
}

#[derive(Debug)]
struct Snapshot {
    pairs: HashSet<String>,
    fetched_at: DateTime<Utc>,
}

pub struct SymbolIndex {
    exchange: Arc<dyn ExchangeProvider>,
    clock: Arc<dyn Clock>,
    quote_asset: String,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl SymbolIndex {
    pub fn new(exchange: Arc<dyn ExchangeProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            exchange,
            clock,
            quote_asset: "USDT".to_string(),
            ttl: DEFAULT_TTL,
            snapshot: RwLock::new(None),
        }
    }

    pub fn with_quote_asset(mut self, quote_asset: impl Into<String>) -> Self {
        self.quote_asset = quote_asset.into().to_uppercase();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn quote_asset(&self) -> &str {
        &self.quote_asset
    }

    /// Re-fetch the universe. Returns the number of cached pairs.
    ///
    /// On failure the previous snapshot is kept and its size returned; the
    /// error only surfaces when there is nothing to fall back to.
    pub fn refresh(&self) -> Result<usize, DataError> {
        match self.exchange.fetch_tradable_universe() {
            Ok(instruments) => {
                let pairs: HashSet<String> = instruments
                    .into_iter()
                    .filter(|i| i.is_trading() && i.quote_asset == self.quote_asset)
                    .map(|i| i.symbol)
                    .collect();
                let count = pairs.len();
                *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(Snapshot {
                    pairs,
                    fetched_at: self.clock.now(),
                });
                tracing::info!(
                    exchange = self.exchange.name(),
                    quote = %self.quote_asset,
                    pairs = count,
                    "symbol index refreshed"
                );
                Ok(count)
            }
            Err(err) => {
                let cached = self
                    .snapshot
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .as_ref()
                    .map(|s| s.pairs.len());
                match cached {
                    Some(count) => {
                        tracing::warn!(error = %err, pairs = count, "symbol refresh failed, keeping cached index");
                        Ok(count)
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Refresh if the cache is empty or older than the TTL.
    pub fn ensure_fresh(&self) -> Result<usize, DataError> {
        if self.is_stale() {
            self.refresh()
        } else {
            Ok(self.len())
        }
    }

    pub fn is_stale(&self) -> bool {
        match self.age() {
            Some(age) => age >= self.ttl,
            None => true,
        }
    }

    /// Pair for an asset code, e.g. `sol` → `SOLUSDT`.
    ///
    /// Tries the upper-cased code, then with whitespace removed, then with
    /// hyphens removed.
    pub fn resolve(&self, asset: &str) -> Result<String, ResolveError> {
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        let not_found = || ResolveError::NotFound {
            asset: asset.to_string(),
        };
        let snapshot = guard.as_ref().ok_or_else(not_found)?;

        let upper = asset.trim().to_uppercase();
        let variants = [
            upper.clone(),
            upper.chars().filter(|c| !c.is_whitespace()).collect::<String>(),
            upper.replace('-', ""),
        ];

        variants
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| format!("{v}{}", self.quote_asset))
            .find(|pair| snapshot.pairs.contains(pair))
            .ok_or_else(not_found)
    }

    pub fn contains(&self, pair: &str) -> bool {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|s| s.pairs.contains(pair))
    }

    pub fn len(&self) -> usize {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |s| s.pairs.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time since the last successful refresh, if any.
    pub fn age(&self) -> Option<Duration> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| elapsed_between(s.fetched_at, self.clock.now()))
    }
}

impl std::fmt::Debug for SymbolIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolIndex")
            .field("exchange", &self.exchange.name())
            .field("quote_asset", &self.quote_asset)
            .field("ttl", &self.ttl)
            .field("pairs", &self.len())
            .finish()
    }
}
