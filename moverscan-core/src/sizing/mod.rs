//! Sizing and labeling — turn a detected pattern into a tradable setup.
//!
//! Sizers translate a dollar risk budget into a position size from the
//! entry/stop distance. Labels file the setup under a playbook.
//!
//! # Non-Responsibilities
//! - Sizing does NOT decide entry/stop (that's the detector's job)
//! - Labels do NOT influence size

pub mod label;
pub mod risk;

pub use label::strategy_label;
pub use risk::{position_size_usd, RiskSizer, SizingError};
