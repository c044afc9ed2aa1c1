//! Binance spot REST client.
//!
//! `exchangeInfo` supplies the tradable universe and `klines` the candles.
//! Klines arrive as positional arrays with prices encoded as strings:
//!
//! ```text
//! [openTime, "open", "high", "low", "close", "volume", closeTime, ...]
//! ```

use super::http::JsonClient;
use super::provider::{DataError, ExchangeProvider};
use crate::domain::{Candle, Instrument};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Binance caps a klines request at 1000 rows.
pub const MAX_KLINES_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    status: String,
    quote_asset: String,
}

impl From<SymbolInfo> for Instrument {
    fn from(s: SymbolInfo) -> Self {
        Instrument {
            symbol: s.symbol,
            status: s.status,
            quote_asset: s.quote_asset,
        }
    }
}

pub struct BinanceClient {
    http: JsonClient,
    base_url: String,
}

impl BinanceClient {
    pub fn new(http: JsonClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn klines_url(&self, pair: &str, interval: &str, limit: usize) -> String {
        format!(
            "{}/api/v3/klines?symbol={pair}&interval={interval}&limit={}",
            self.base_url,
            limit.clamp(1, MAX_KLINES_LIMIT)
        )
    }
}

impl ExchangeProvider for BinanceClient {
    fn name(&self) -> &str {
        "binance"
    }

    fn fetch_tradable_universe(&self) -> Result<Vec<Instrument>, DataError> {
        let url = format!("{}/api/v3/exchangeInfo", self.base_url);
        parse_exchange_info(&self.http.get_text(&url)?)
    }

    fn fetch_candles(
        &self,
        pair: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let url = self.klines_url(pair, interval, limit);
        match self.http.get_text(&url) {
            Ok(body) => parse_klines(&body),
            // Binance answers an unknown pair with 400 / -1121
            Err(DataError::Http { status: 400, .. }) => Err(DataError::SymbolNotFound {
                symbol: pair.to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}

/// Decode an `exchangeInfo` body into instruments.
pub fn parse_exchange_info(body: &str) -> Result<Vec<Instrument>, DataError> {
    let info: ExchangeInfo = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("exchangeInfo: {e}")))?;
    Ok(info.symbols.into_iter().map(Instrument::from).collect())
}

/// Decode a klines body into candles, oldest first.
pub fn parse_klines(body: &str) -> Result<Vec<Candle>, DataError> {
    let rows: Vec<Value> = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("klines: {e}")))?;
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            parse_kline(row)
                .ok_or_else(|| DataError::ResponseFormatChanged(format!("malformed kline row {i}")))
        })
        .collect()
}

fn parse_kline(row: &Value) -> Option<Candle> {
    let arr = row.as_array()?;
    if arr.len() < 7 {
        return None;
    }
    let num = |v: &Value| -> Option<f64> { v.as_str()?.parse().ok() };
    Some(Candle {
        open_time: arr[0].as_i64()?,
        open: num(&arr[1])?,
        high: num(&arr[2])?,
        low: num(&arr[3])?,
        close: num(&arr[4])?,
        volume: num(&arr[5])?,
        close_time: arr[6].as_i64()?,
    })
}
