//! Candidates — movers that made it out of the feed and into a scan.

use serde::{Deserialize, Serialize};

/// Raw record from the top-movers feed, before filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub change_24h_pct: f64,
    pub vol_24h_usd: f64,
    pub price_usd: f64,
}

/// A mover considered by one scan run. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    /// Exchange-native asset code (e.g. `SOL`), not a pair.
    pub symbol: String,
    pub name: String,
    /// 24h change in percent.
    pub change_24h: f64,
    pub vol_24h_usd: f64,
    pub price: f64,
}

impl From<Mover> for Candidate {
    fn from(m: Mover) -> Self {
        Self {
            id: m.id,
            symbol: m.symbol,
            name: m.name,
            change_24h: m.change_24h_pct,
            vol_24h_usd: m.vol_24h_usd,
            price: m.price_usd,
        }
    }
}

/// Tradable instrument as listed by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub status: String,
    pub quote_asset: String,
}

impl Instrument {
    /// Status string the exchange uses for pairs that accept orders.
    pub const TRADING: &'static str = "TRADING";

    pub fn is_trading(&self) -> bool {
        self.status == Self::TRADING
    }
}
