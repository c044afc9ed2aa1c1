//! Domain types for the movers scan

pub mod candidate;
pub mod candle;
pub mod setup;

pub use candidate::{Candidate, Instrument, Mover};
pub use candle::{Candle, CandleColumns};
pub use setup::{ScanResult, Setup, SetupType, StrategyLabel};
