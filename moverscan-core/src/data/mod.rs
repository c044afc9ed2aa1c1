//! Data collaborators: movers feed, exchange, symbol index.

pub mod binance;
pub mod circuit_breaker;
pub mod coingecko;
pub mod http;
pub mod provider;
pub mod symbol_index;

pub use binance::BinanceClient;
pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use coingecko::CoinGeckoMovers;
pub use http::JsonClient;
pub use provider::{DataError, ExchangeProvider, MoversProvider};
pub use symbol_index::{ResolveError, SymbolIndex};

use crate::clock::{Clock, Sleeper};
use crate::config::DataConfig;
use std::sync::Arc;

/// The production pair of collaborators.
pub struct LiveProviders {
    pub movers: Arc<dyn MoversProvider>,
    pub exchange: Arc<dyn ExchangeProvider>,
}

/// CoinGecko + Binance clients, each with its own circuit breaker.
pub fn live_providers(
    config: &DataConfig,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
) -> Result<LiveProviders, DataError> {
    let client = |clock: Arc<dyn Clock>| {
        let breaker = Arc::new(CircuitBreaker::new(config.breaker_cooldown(), clock));
        JsonClient::new(config.http_timeout(), breaker, sleeper.clone())
    };

    let movers = CoinGeckoMovers::new(client(clock.clone())?, config.coingecko_url.clone());
    let exchange = BinanceClient::new(client(clock)?, config.binance_url.clone());

    Ok(LiveProviders {
        movers: Arc::new(movers),
        exchange: Arc::new(exchange),
    })
}
