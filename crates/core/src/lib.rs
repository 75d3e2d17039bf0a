//! Candlewatch core.
//!
//! Turns aggregated candle series into deduplicated trading signals:
//! - [`indicators`] - RSI, SMA and volatility folded into one score
//! - [`signals`] - signal model, per-day deduplication, notifier trait
//! - [`scanner`] - the ranking and analysis cycle

pub mod errors;
pub mod indicators;
pub mod scanner;
pub mod signals;

pub use errors::{Error, Result};
pub use indicators::{analyze, Analysis, Direction};
pub use scanner::{CycleReport, Scanner, ScannerConfig};
pub use signals::{LogNotifier, Signal, SignalDeduplicator, SignalNotifier};

// Re-export the market data crate so downstream users need one dependency.
pub use candlewatch_market_data as market_data;
