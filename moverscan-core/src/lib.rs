//! MoverScan Core — screening the day's top crypto movers for trade setups.
//!
//! This crate contains the whole pipeline:
//! - Domain types (candles, candidates, setups, scan results)
//! - Indicators (EMA, SMA, window extremes)
//! - Trend gates and anomaly vetoes
//! - Pullback and breakout detectors
//! - Fixed-risk sizing, strategy labels and reasoning text
//! - Data collaborators (movers feed, exchange, symbol index) behind traits
//! - The scan orchestrator

pub mod clock;
pub mod config;
pub mod data;
pub mod domain;
pub mod filters;
pub mod indicators;
pub mod patterns;
pub mod rate_limit;
pub mod reasoning;
pub mod scan;
pub mod sizing;

pub use config::ScanConfig;
pub use domain::{Candidate, Candle, ScanResult, Setup, SetupType, StrategyLabel};
pub use scan::{CandidateError, ScanError, Scanner};
