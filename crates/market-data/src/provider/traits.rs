//! Market data provider trait definitions.
//!
//! Two layers:
//! - [`CandleAdapter`] is what each exchange implements: how to build the
//!   request and how to map one native row into a [`Candle`].
//! - [`MarketDataProvider`] is the object-safe, async contract the aggregator
//!   races. [`HttpProvider`](super::HttpProvider) turns any adapter into one.

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;

use crate::errors::MarketDataError;
use crate::models::{Candle, CandleInterval, CandleSeries, Subject};

/// A fully described GET request against a provider's public endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderRequest {
    pub url: String,
    pub query: Vec<(&'static str, String)>,
}

impl ProviderRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// Look up a query parameter (used by tests and diagnostics).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Per-exchange request building and row mapping.
///
/// # Example
///
/// ```ignore
/// struct MyExchange;
///
/// impl CandleAdapter for MyExchange {
///     type Response = Vec<Vec<serde_json::Value>>;
///     type Row = Vec<serde_json::Value>;
///
///     fn id(&self) -> &'static str {
///         "MY_EXCHANGE"
///     }
///
///     fn build_request(&self, subject: &Subject, interval: CandleInterval, limit: usize) -> ProviderRequest {
///         ProviderRequest::new("https://api.example.com/klines")
///             .param("symbol", subject.concatenated())
///             .param("limit", limit)
///     }
///
///     fn rows(&self, response: Self::Response) -> Result<Vec<Self::Row>, MarketDataError> {
///         Ok(response)
///     }
///
///     fn map_row(&self, row: &Self::Row) -> Option<Candle> {
///         LAYOUT.map(row)
///     }
/// }
/// ```
pub trait CandleAdapter: Send + Sync + 'static {
    /// Deserialized response envelope.
    type Response: DeserializeOwned + Send;

    /// One native candle row inside the envelope.
    type Row: Send;

    /// Unique identifier, e.g. "BINANCE". Used for logging, circuit breaker
    /// tracking and fetch diagnostics.
    fn id(&self) -> &'static str;

    /// Lower values win when several providers succeed. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Build the request for `limit` candles of `interval` for `subject`.
    fn build_request(
        &self,
        subject: &Subject,
        interval: CandleInterval,
        limit: usize,
    ) -> ProviderRequest;

    /// Unwrap the envelope into native rows, rejecting error payloads.
    fn rows(&self, response: Self::Response) -> Result<Vec<Self::Row>, MarketDataError>;

    /// Map one native row. `None` when the row does not have the expected shape.
    fn map_row(&self, row: &Self::Row) -> Option<Candle>;

    /// Parse a raw response body into a canonical series.
    fn parse(&self, body: &str, max_candles: usize) -> Result<CandleSeries, MarketDataError> {
        let response: Self::Response =
            serde_json::from_str(body).map_err(|e| MarketDataError::Malformed {
                provider: self.id().to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        let rows = self.rows(response)?;
        let total = rows.len();
        let candles: Vec<Candle> = rows.iter().filter_map(|row| self.map_row(row)).collect();

        if candles.len() < total {
            debug!(
                "{}: {} of {} rows did not match the expected shape",
                self.id(),
                total - candles.len(),
                total
            );
        }

        CandleSeries::normalize(self.id(), candles, max_candles)
    }
}

/// Trait for candle sources raced by the aggregator.
///
/// Implementations must be cancellation-safe: the aggregator may drop the
/// future at any await point.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = higher priority. Default is 10. Ties keep
    /// registration order.
    fn priority(&self) -> u8 {
        10
    }

    /// Fetch up to `max_candles` of the most recent candles for `subject`.
    ///
    /// Returns a validated series (at least 20 candles, positive closes,
    /// strictly increasing timestamps) or the reason the provider produced
    /// no usable result.
    async fn fetch_candles(
        &self,
        subject: &Subject,
        interval: CandleInterval,
        max_candles: usize,
    ) -> Result<CandleSeries, MarketDataError>;
}

/// 24h trading activity for one pair, used to pick which subjects to scan.
#[derive(Clone, Debug, PartialEq)]
pub struct TickerVolume {
    pub subject: Subject,
    /// Traded volume over the last 24h, in units of the quote asset.
    pub quote_volume: f64,
}

/// Source of 24h ticker statistics.
#[async_trait]
pub trait TickerSource: Send + Sync {
    fn id(&self) -> &'static str;

    /// All pairs quoted in `quote_asset`, in no particular order.
    async fn fetch_volumes(&self, quote_asset: &str) -> Result<Vec<TickerVolume>, MarketDataError>;
}
