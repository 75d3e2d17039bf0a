//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `types` - Type aliases for common identifiers (ProviderId, TimestampMs)
//! - `subject` - Tracked instrument identity (`BASE/QUOTE`)
//! - `interval` - Candle spacing and its per-provider spellings
//! - `candle` - Canonical OHLCV candle and the validated series built from it

mod candle;
mod interval;
mod subject;
mod types;

pub use candle::{Candle, CandleSeries, MIN_SERIES_LEN};
pub use interval::CandleInterval;
pub use subject::Subject;
pub use types::{ProviderId, TimestampMs};
