//! End-to-end scans against fixture providers.
//!
//! Tests:
//! 1. A steady climber yields exactly one pullback setup with the expected label
//! 2. Identical fixtures give identical trade numbers across runs
//! 3. Bootstrap failures are fatal; a cached universe survives a failed refresh
//! 4. Per-candidate failures are skipped without aborting the scan
//! 5. Each veto stops a candidate at its own gate
//! 6. Candidates are paced by the rate limiter on the injected clock
//! 7. Concurrent scans on one scanner agree

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use moverscan_core::clock::ManualClock;
use moverscan_core::data::{DataError, ExchangeProvider, MoversProvider};
use moverscan_core::domain::{Candidate, Candle, Instrument, Mover, SetupType, StrategyLabel};
use moverscan_core::filters::Gate;
use moverscan_core::rate_limit::Unthrottled;
use moverscan_core::scan::{CandidateOutcome, SkipReason};
use moverscan_core::sizing::RiskSizer;
use moverscan_core::{ScanConfig, ScanError, Scanner};

const T0: i64 = 1_700_000_000_000;
const DAY_MS: i64 = 86_400_000;
const H4_MS: i64 = 14_400_000;

// ── Helpers ──────────────────────────────────────────────────────────

/// Candles from a close path: open = previous close, ±0.2% wicks.
fn from_closes(closes: &[f64], volumes: &[f64], step_ms: i64) -> Vec<Candle> {
    let mut prev = closes[0];
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let c = Candle {
                open_time: i as i64 * step_ms,
                open: prev,
                high: close.max(prev) * 1.002,
                low: close.min(prev) * 0.998,
                close,
                volume,
                close_time: (i as i64 + 1) * step_ms - 1,
            };
            prev = close;
            c
        })
        .collect()
}

/// Compounding climb of `pct` percent per bar from 1.0.
fn climb(n: usize, pct: f64) -> Vec<f64> {
    (0..n).map(|i| (1.0 + pct / 100.0).powi(i as i32 + 1)).collect()
}

fn flat_volume(n: usize) -> Vec<f64> {
    vec![1_000.0; n]
}

/// Daily: 60 bars up 1% each. 4h: 60 bars up 0.1% each.
fn healthy_series() -> (Vec<Candle>, Vec<Candle>) {
    let daily = from_closes(&climb(60, 1.0), &flat_volume(60), DAY_MS);
    let intraday = from_closes(&climb(60, 0.1), &flat_volume(60), H4_MS);
    (daily, intraday)
}

fn mover(symbol: &str, change: f64) -> Mover {
    Mover {
        id: symbol.to_lowercase(),
        symbol: symbol.to_string(),
        name: format!("{symbol} Token"),
        change_24h_pct: change,
        vol_24h_usd: 2_000_000.0,
        price_usd: 1.06,
    }
}

#[derive(Default)]
struct Market {
    movers: Mutex<Vec<Mover>>,
    series: Mutex<HashMap<(String, String), Vec<Candle>>>,
    broken_pairs: Mutex<HashSet<String>>,
    movers_down: AtomicBool,
    universe_down: AtomicBool,
    universe_calls: AtomicUsize,
    candle_calls: AtomicUsize,
}

impl Market {
    fn with(movers: Vec<Mover>) -> Arc<Self> {
        let market = Arc::new(Self::default());
        *market.movers.lock().unwrap() = movers;
        market
    }

    fn list(&self, pair: &str, daily: Vec<Candle>, intraday: Vec<Candle>) {
        let mut series = self.series.lock().unwrap();
        series.insert((pair.to_string(), "1d".to_string()), daily);
        series.insert((pair.to_string(), "4h".to_string()), intraday);
    }

    fn list_healthy(&self, pair: &str) {
        let (daily, intraday) = healthy_series();
        self.list(pair, daily, intraday);
    }
}

impl MoversProvider for Market {
    fn name(&self) -> &str {
        "fixture-movers"
    }

    fn fetch_top_movers(&self, _timeframe: &str) -> Result<Vec<Mover>, DataError> {
        if self.movers_down.load(Ordering::SeqCst) {
            return Err(DataError::NetworkUnreachable("movers feed down".into()));
        }
        Ok(self.movers.lock().unwrap().clone())
    }
}

impl ExchangeProvider for Market {
    fn name(&self) -> &str {
        "fixture-exchange"
    }

    fn fetch_tradable_universe(&self) -> Result<Vec<Instrument>, DataError> {
        self.universe_calls.fetch_add(1, Ordering::SeqCst);
        if self.universe_down.load(Ordering::SeqCst) {
            return Err(DataError::Http {
                status: 503,
                url: "exchangeInfo".into(),
            });
        }
        let series = self.series.lock().unwrap();
        let pairs: HashSet<&String> = series.keys().map(|(pair, _)| pair).collect();
        Ok(pairs
            .into_iter()
            .map(|pair| Instrument {
                symbol: pair.clone(),
                status: Instrument::TRADING.to_string(),
                quote_asset: "USDT".to_string(),
            })
            .collect())
    }

    fn fetch_candles(
        &self,
        pair: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        self.candle_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_pairs.lock().unwrap().contains(pair) {
            return Err(DataError::NetworkUnreachable(format!("timeout on {pair}")));
        }
        let series = self.series.lock().unwrap();
        let candles = series
            .get(&(pair.to_string(), interval.to_string()))
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: pair.to_string(),
            })?;
        let start = candles.len().saturating_sub(limit);
        Ok(candles[start..].to_vec())
    }
}

fn seeded_config() -> ScanConfig {
    let mut config = ScanConfig::default();
    config.reasoning.seed = Some(42);
    config
}

/// Scanner on a manual clock with the default 300 ms limiter.
fn paced_scanner(market: &Arc<Market>) -> (Arc<ManualClock>, Scanner) {
    let clock = Arc::new(ManualClock::at_millis(T0));
    let scanner = Scanner::new(
        seeded_config(),
        market.clone(),
        market.clone(),
        clock.clone(),
        clock.clone(),
    );
    (clock, scanner)
}

fn scanner(market: &Arc<Market>) -> Scanner {
    paced_scanner(market).1.with_limiter(Arc::new(Unthrottled))
}

fn outcome_for(scanner: &Scanner, symbol: &str) -> CandidateOutcome {
    scanner.symbol_index().refresh().unwrap();
    let sizer = RiskSizer::new(10_000.0, 0.02).unwrap();
    let candidate = Candidate::from(mover(symbol, 25.0));
    scanner.evaluate(&candidate, &sizer).unwrap()
}

// ── 1. Happy path ────────────────────────────────────────────────────

#[test]
fn steady_climber_yields_new_baseline_pullback() {
    let market = Market::with(vec![mover("FOO", 25.0)]);
    market.list_healthy("FOOUSDT");

    let result = scanner(&market).run_scan(10_000.0, 0.02).unwrap();

    assert_eq!(result.top_movers.len(), 1);
    assert_eq!(result.candidates.len(), 1);
    assert_eq!(result.setups.len(), 1);

    let setup = &result.setups[0];
    assert_eq!(setup.symbol, "FOOUSDT");
    assert_eq!(setup.coin_name, "FOO Token");
    assert_eq!(setup.setup_type, SetupType::Pullback4h20Ema);
    assert_eq!(setup.strategy_label, StrategyLabel::NewBaseline);
    assert_eq!(setup.change_24h, 25.0);
    assert!(setup.entry > setup.stop);
    assert!(setup.risk_pct > 0.5 && setup.risk_pct <= 2.0, "risk {}", setup.risk_pct);
    assert!(setup.entry_zone.0 <= setup.entry && setup.entry <= setup.entry_zone.1);
    assert!(!setup.reasoning.is_empty());

    let expected_size = 10_000.0 * 0.02 / (setup.entry - setup.stop);
    assert!((setup.position_size_usd - expected_size).abs() < 1e-9);
}

#[test]
fn strong_mover_pullback_is_monk_mode() {
    // change 50 is neither < 30 nor > 50; the label table wins over the
    // worked example that calls this New Baseline (DESIGN.md decision 14)
    let market = Market::with(vec![mover("FOO", 50.0)]);
    market.list_healthy("FOOUSDT");

    let result = scanner(&market).run_scan(10_000.0, 0.02).unwrap();
    assert_eq!(result.setups.len(), 1);
    assert_eq!(result.setups[0].strategy_label, StrategyLabel::MonkMode);
}

#[test]
fn result_serializes_with_camel_case_keys() {
    let market = Market::with(vec![mover("FOO", 25.0), mover("BAR", 3.0)]);
    market.list_healthy("FOOUSDT");

    let result = scanner(&market).run_scan(10_000.0, 0.02).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["topMovers"].as_array().unwrap().len(), 2);
    assert_eq!(json["candidates"].as_array().unwrap().len(), 1);
    assert_eq!(json["candidates"][0]["change24h"], 25.0);
    assert_eq!(json["candidates"][0]["vol24hUsd"], 2_000_000.0);
    let setup = &json["setups"][0];
    assert_eq!(setup["setupType"], "pullback_4h_20ema");
    assert_eq!(setup["strategyLabel"], "New Baseline");
    assert!(setup["positionSizeUsd"].is_number());
    assert_eq!(setup["entryZone"].as_array().unwrap().len(), 2);
}

// ── 2. Idempotence ───────────────────────────────────────────────────

#[test]
fn repeated_scans_give_identical_numbers() {
    let market = Market::with(vec![mover("FOO", 25.0), mover("BAZ", 18.0)]);
    market.list_healthy("FOOUSDT");
    market.list_healthy("BAZUSDT");
    let scanner = scanner(&market);

    let first = scanner.run_scan(25_000.0, 0.01).unwrap();
    let second = scanner.run_scan(25_000.0, 0.01).unwrap();

    assert_eq!(first.setups.len(), 2);
    assert_eq!(first.setups.len(), second.setups.len());
    for (a, b) in first.setups.iter().zip(&second.setups) {
        assert_eq!(a.symbol, b.symbol);
        assert_eq!(a.entry, b.entry);
        assert_eq!(a.stop, b.stop);
        assert_eq!(a.risk_pct, b.risk_pct);
        assert_eq!(a.position_size_usd, b.position_size_usd);
        assert_eq!(a.reasoning, b.reasoning);
    }
}

// ── 3. Bootstrap failures ────────────────────────────────────────────

#[test]
fn movers_failure_is_fatal() {
    let market = Market::with(vec![mover("FOO", 25.0)]);
    market.list_healthy("FOOUSDT");
    market.movers_down.store(true, Ordering::SeqCst);

    let err = scanner(&market).run_scan(10_000.0, 0.02).unwrap_err();
    assert!(matches!(err, ScanError::Movers(_)));
    assert_eq!(market.candle_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn universe_failure_without_cache_is_fatal() {
    let market = Market::with(vec![mover("FOO", 25.0)]);
    market.list_healthy("FOOUSDT");
    market.universe_down.store(true, Ordering::SeqCst);

    let err = scanner(&market).run_scan(10_000.0, 0.02).unwrap_err();
    assert!(matches!(err, ScanError::SymbolIndex(_)));
}

#[test]
fn stale_cache_survives_failed_refresh() {
    let market = Market::with(vec![mover("FOO", 25.0)]);
    market.list_healthy("FOOUSDT");
    let (clock, scanner) = paced_scanner(&market);
    let scanner = scanner.with_limiter(Arc::new(Unthrottled));

    assert_eq!(scanner.run_scan(10_000.0, 0.02).unwrap().setups.len(), 1);

    clock.advance(Duration::from_secs(2 * 60 * 60));
    market.universe_down.store(true, Ordering::SeqCst);

    let result = scanner.run_scan(10_000.0, 0.02).unwrap();
    assert_eq!(result.setups.len(), 1);
    assert_eq!(market.universe_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn fresh_cache_is_not_refetched() {
    let market = Market::with(vec![mover("FOO", 25.0)]);
    market.list_healthy("FOOUSDT");
    let scanner = scanner(&market);

    scanner.run_scan(10_000.0, 0.02).unwrap();
    scanner.run_scan(10_000.0, 0.02).unwrap();
    assert_eq!(market.universe_calls.load(Ordering::SeqCst), 1);
}

// ── 4. Per-candidate failures ────────────────────────────────────────

#[test]
fn broken_candidate_does_not_abort_the_scan() {
    let market = Market::with(vec![
        mover("BAD", 40.0),
        mover("GHOST", 30.0),
        mover("FOO", 25.0),
    ]);
    market.list_healthy("BADUSDT");
    market.list_healthy("FOOUSDT");
    market.broken_pairs.lock().unwrap().insert("BADUSDT".into());

    let result = scanner(&market).run_scan(10_000.0, 0.02).unwrap();
    assert_eq!(result.candidates.len(), 3);
    assert_eq!(result.setups.len(), 1);
    assert_eq!(result.setups[0].symbol, "FOOUSDT");
}

#[test]
fn short_history_is_skipped() {
    let market = Market::with(vec![mover("NEW", 25.0), mover("FOO", 25.0)]);
    let (daily, intraday) = healthy_series();
    market.list("NEWUSDT", daily[..40].to_vec(), intraday);
    market.list_healthy("FOOUSDT");

    let result = scanner(&market).run_scan(10_000.0, 0.02).unwrap();
    assert_eq!(result.setups.len(), 1);
    assert_eq!(result.setups[0].symbol, "FOOUSDT");
}

// ── 5. Vetoes ────────────────────────────────────────────────────────

#[test]
fn falling_daily_trend_is_vetoed() {
    let market = Market::with(vec![mover("FOO", 25.0)]);
    let closes: Vec<f64> = climb(60, 1.0).into_iter().rev().collect();
    let daily = from_closes(&closes, &flat_volume(60), DAY_MS);
    market.list("FOOUSDT", daily, healthy_series().1);

    assert!(matches!(
        outcome_for(&scanner(&market), "FOO"),
        CandidateOutcome::Skipped(SkipReason::Gate(Gate::DailyTrend))
    ));
}

#[test]
fn late_pump_is_vetoed() {
    let market = Market::with(vec![mover("FOO", 25.0)]);
    let mut closes = climb(60, 1.0);
    let mut volumes = flat_volume(60);
    closes[59] = closes[58] * 1.7;
    volumes[59] = 20_000.0;
    let daily = from_closes(&closes, &volumes, DAY_MS);
    market.list("FOOUSDT", daily, healthy_series().1);

    assert!(matches!(
        outcome_for(&scanner(&market), "FOO"),
        CandidateOutcome::Skipped(SkipReason::Gate(Gate::LatePump))
    ));
}

#[test]
fn parabolic_intraday_is_vetoed() {
    let market = Market::with(vec![mover("FOO", 25.0)]);
    let mut closes = climb(60, 0.1);
    for i in 52..60 {
        closes[i] = closes[i - 1] * 1.04;
    }
    let intraday = from_closes(&closes, &flat_volume(60), H4_MS);
    market.list("FOOUSDT", healthy_series().0, intraday);

    assert!(matches!(
        outcome_for(&scanner(&market), "FOO"),
        CandidateOutcome::Skipped(SkipReason::Gate(Gate::TooVertical))
    ));
}

#[test]
fn selling_volume_is_vetoed() {
    let market = Market::with(vec![mover("FOO", 25.0)]);
    let mut closes = climb(60, 0.1);
    let mut volumes = flat_volume(60);
    for i in 50..60 {
        let up = i % 2 == 1;
        closes[i] = closes[i - 1] * if up { 1.01 } else { 0.995 };
        volumes[i] = if up { 100.0 } else { 1_000.0 };
    }
    let intraday = from_closes(&closes, &volumes, H4_MS);
    market.list("FOOUSDT", healthy_series().0, intraday);

    assert!(matches!(
        outcome_for(&scanner(&market), "FOO"),
        CandidateOutcome::Skipped(SkipReason::Gate(Gate::VolumeHealth))
    ));
}

#[test]
fn blow_off_top_is_vetoed() {
    let market = Market::with(vec![mover("FOO", 25.0)]);
    let mut closes = climb(60, 0.1);
    let mut volumes = flat_volume(60);
    closes[57] = closes[56] * 1.35;
    volumes[57] = 20_000.0;
    closes[58] = closes[57] * 0.9;
    closes[59] = closes[58] * 0.9;
    let intraday = from_closes(&closes, &volumes, H4_MS);
    market.list("FOOUSDT", healthy_series().0, intraday);

    assert!(matches!(
        outcome_for(&scanner(&market), "FOO"),
        CandidateOutcome::Skipped(SkipReason::Gate(Gate::BlowOffTop))
    ));
}

// ── 6. Pacing ────────────────────────────────────────────────────────

#[test]
fn candidates_are_spaced_by_the_limiter() {
    let market = Market::with(vec![
        mover("AAA", 20.0),
        mover("BBB", 20.0),
        mover("CCC", 20.0),
    ]);
    market.list_healthy("AAAUSDT");
    market.list_healthy("BBBUSDT");
    market.list_healthy("CCCUSDT");
    let (clock, scanner) = paced_scanner(&market);

    let result = scanner.run_scan(10_000.0, 0.02).unwrap();

    assert_eq!(clock.sleeps(), vec![Duration::from_millis(300); 2]);
    let stamps: Vec<i64> = result
        .setups
        .iter()
        .map(|s| s.timestamp.timestamp_millis())
        .collect();
    assert_eq!(stamps, vec![T0, T0 + 300, T0 + 600]);
}

#[test]
fn filtered_out_movers_cost_no_requests() {
    let market = Market::with(vec![mover("TINY", 5.0), mover("HUGE", 500.0)]);
    market.list_healthy("TINYUSDT");
    market.list_healthy("HUGEUSDT");
    let (clock, scanner) = paced_scanner(&market);

    let result = scanner.run_scan(10_000.0, 0.02).unwrap();
    assert!(result.candidates.is_empty());
    assert!(result.setups.is_empty());
    assert_eq!(result.top_movers.len(), 2);
    assert_eq!(market.candle_calls.load(Ordering::SeqCst), 0);
    assert!(clock.sleeps().is_empty());
}

// ── 7. Concurrency ───────────────────────────────────────────────────

#[test]
fn concurrent_scans_agree() {
    let market = Market::with(vec![mover("FOO", 25.0), mover("BAZ", 18.0)]);
    market.list_healthy("FOOUSDT");
    market.list_healthy("BAZUSDT");
    let scanner = scanner(&market);

    let (a, b) = std::thread::scope(|s| {
        let a = s.spawn(|| scanner.run_scan(10_000.0, 0.02));
        let b = s.spawn(|| scanner.run_scan(10_000.0, 0.02));
        (a.join().unwrap().unwrap(), b.join().unwrap().unwrap())
    });

    assert_eq!(a.setups.len(), 2);
    assert_eq!(a.setups, b.setups);
}
