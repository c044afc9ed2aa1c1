//! CoinGecko top-movers feed.
//!
//! Pulls the 250 highest-volume coins from `/coins/markets` and orders them
//! by 24h change, biggest gainers first. Coins with no reported change sort
//! last.

use super::http::JsonClient;
use super::provider::{DataError, MoversProvider};
use crate::domain::Mover;
use serde::Deserialize;
use std::cmp::Ordering;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const PER_PAGE: usize = 250;

/// The only change window the ranking reads (`price_change_percentage_24h`).
pub const MOVERS_TIMEFRAME: &str = "24h";

#[derive(Debug, Deserialize)]
struct MarketRow {
    id: String,
    symbol: String,
    name: String,
    current_price: Option<f64>,
    total_volume: Option<f64>,
    price_change_percentage_24h: Option<f64>,
}

pub struct CoinGeckoMovers {
    http: JsonClient,
    base_url: String,
}

impl CoinGeckoMovers {
    pub fn new(http: JsonClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn markets_url(&self) -> String {
        format!(
            "{}/coins/markets?vs_currency=usd&order=volume_desc&per_page={PER_PAGE}\
             &page=1&price_change_percentage={MOVERS_TIMEFRAME}",
            self.base_url
        )
    }
}

impl MoversProvider for CoinGeckoMovers {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn fetch_top_movers(&self, timeframe: &str) -> Result<Vec<Mover>, DataError> {
        if timeframe != MOVERS_TIMEFRAME {
            return Err(DataError::Other(format!(
                "unsupported movers timeframe '{timeframe}', only {MOVERS_TIMEFRAME} is ranked"
            )));
        }
        parse_markets(&self.http.get_text(&self.markets_url())?)
    }
}

/// Decode a `/coins/markets` body into ranked movers.
pub fn parse_markets(body: &str) -> Result<Vec<Mover>, DataError> {
    let rows: Vec<MarketRow> = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("coins/markets: {e}")))?;
    Ok(rank_movers(rows))
}

fn rank_movers(rows: Vec<MarketRow>) -> Vec<Mover> {
    let mut ranked: Vec<(Option<f64>, Mover)> = rows
        .into_iter()
        .map(|r| {
            let change = r.price_change_percentage_24h.filter(|c| c.is_finite());
            let mover = Mover {
                id: r.id,
                symbol: r.symbol.to_uppercase(),
                name: r.name,
                change_24h_pct: change.unwrap_or(f64::NAN),
                vol_24h_usd: r.total_volume.unwrap_or(0.0),
                price_usd: r.current_price.unwrap_or(f64::NAN),
            };
            (change, mover)
        })
        .collect();

    // Stable: equal changes keep the feed's volume order
    ranked.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    ranked.into_iter().map(|(_, m)| m).collect()
}
