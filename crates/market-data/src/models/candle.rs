use serde::{Deserialize, Serialize};

use super::types::TimestampMs;
use crate::errors::MarketDataError;

/// Minimum number of candles a series needs to be usable by the indicators.
pub const MIN_SERIES_LEN: usize = 20;

/// Canonical OHLCV candle every provider response is mapped into.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time, milliseconds since the Unix epoch
    pub timestamp: TimestampMs,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: TimestampMs,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// A candle is usable when every field is finite and the close is positive.
    pub fn is_valid(&self) -> bool {
        let finite = [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite());
        finite && self.close > 0.0
    }
}

/// Ordered candles, most recent last.
///
/// Can only be built through [`CandleSeries::normalize`], so every instance
/// holds at least [`MIN_SERIES_LEN`] valid candles with strictly increasing
/// timestamps.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Filter, order and trim raw provider rows into a usable series.
    ///
    /// - drops rows with a non-finite field or a non-positive close
    /// - sorts ascending by timestamp and keeps the first row per timestamp
    /// - keeps the most recent `max_len` candles
    /// - fails with `InsufficientData` when fewer than [`MIN_SERIES_LEN`] remain
    pub fn normalize(
        provider: &str,
        rows: Vec<Candle>,
        max_len: usize,
    ) -> Result<Self, MarketDataError> {
        let mut candles: Vec<Candle> = rows.into_iter().filter(Candle::is_valid).collect();

        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);

        if candles.len() > max_len {
            candles.drain(..candles.len() - max_len);
        }

        if candles.len() < MIN_SERIES_LEN {
            return Err(MarketDataError::InsufficientData {
                provider: provider.to_string(),
                valid: candles.len(),
                required: MIN_SERIES_LEN,
            });
        }

        Ok(Self { candles })
    }

    /// Wrap candles the synthetic generator built. The generator upholds the
    /// series invariants itself.
    pub(crate) fn from_generated(candles: Vec<Candle>) -> Self {
        debug_assert!(candles.len() >= MIN_SERIES_LEN);
        debug_assert!(candles.iter().all(Candle::is_valid));
        debug_assert!(candles.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        Self { candles }
    }

    /// Same as [`normalize`](Self::normalize) without trimming.
    pub fn from_candles(provider: &str, rows: Vec<Candle>) -> Result<Self, MarketDataError> {
        Self::normalize(provider, rows, usize::MAX)
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Most recent candle.
    pub fn last(&self) -> &Candle {
        // Non-empty by construction.
        &self.candles[self.candles.len() - 1]
    }

    /// The last `n` candles (or all of them if the series is shorter).
    pub fn tail(&self, n: usize) -> &[Candle] {
        let start = self.candles.len().saturating_sub(n);
        &self.candles[start..]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn into_candles(self) -> Vec<Candle> {
        self.candles
    }
}
