//! Binance spot market data.
//!
//! - Candles via `GET /api/v3/klines`
//! - 24h volume ranking via `GET /api/v3/ticker/24hr` (see [`tickers`])
//!
//! Both endpoints are public. Weight limit is 6000/min per IP; the klines
//! call costs 2.
//! API documentation: https://developers.binance.com/docs/binance-spot-api-docs/rest-api

mod tickers;

pub use tickers::BinanceTickerSource;

use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{Candle, CandleInterval, Subject};
use crate::provider::row::{RowLayout, TimestampUnit};
use crate::provider::{CandleAdapter, ProviderRequest};

const BASE_URL: &str = "https://api.binance.com";
const PROVIDER_ID: &str = "BINANCE";

/// Largest `limit` the klines endpoint accepts.
const MAX_LIMIT: usize = 1000;

/// `[openTime, open, high, low, close, volume, closeTime, quoteVolume, trades, ...]`
const LAYOUT: RowLayout = RowLayout::ohlcv(TimestampUnit::Millis);

/// Binance spot klines adapter.
#[derive(Clone, Debug)]
pub struct BinanceAdapter {
    base_url: String,
}

impl BinanceAdapter {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for BinanceAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn interval_token(interval: CandleInterval) -> &'static str {
    match interval {
        CandleInterval::FifteenMinutes => "15m",
        CandleInterval::OneHour => "1h",
        CandleInterval::FourHours => "4h",
        CandleInterval::OneDay => "1d",
    }
}

impl CandleAdapter for BinanceAdapter {
    type Response = Vec<Vec<Value>>;
    type Row = Vec<Value>;

    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn build_request(
        &self,
        subject: &Subject,
        interval: CandleInterval,
        limit: usize,
    ) -> ProviderRequest {
        ProviderRequest::new(format!("{}/api/v3/klines", self.base_url))
            .param("symbol", subject.concatenated())
            .param("interval", interval_token(interval))
            .param("limit", limit.clamp(1, MAX_LIMIT))
    }

    fn rows(&self, response: Self::Response) -> Result<Vec<Self::Row>, MarketDataError> {
        Ok(response)
    }

    fn map_row(&self, row: &Self::Row) -> Option<Candle> {
        LAYOUT.map(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(count: usize) -> String {
        let rows: Vec<Value> = (0..count)
            .map(|i| {
                let open_time = 1_700_000_000_000i64 + i as i64 * 3_600_000;
                json!([
                    open_time,
                    format!("{:.2}", 100.0 + i as f64),
                    format!("{:.2}", 101.0 + i as f64),
                    format!("{:.2}", 99.0 + i as f64),
                    format!("{:.2}", 100.5 + i as f64),
                    "1523.10",
                    open_time + 3_599_999,
                    "152310.00",
                    42,
                    "700.00",
                    "70000.00",
                    "0"
                ])
            })
            .collect();
        serde_json::to_string(&rows).unwrap()
    }

    #[test]
    fn test_build_request() {
        let subject: Subject = "BTC/USDT".parse().unwrap();
        let request = BinanceAdapter::new().build_request(&subject, CandleInterval::OneHour, 100);

        assert_eq!(request.url, "https://api.binance.com/api/v3/klines");
        assert_eq!(request.get("symbol"), Some("BTCUSDT"));
        assert_eq!(request.get("interval"), Some("1h"));
        assert_eq!(request.get("limit"), Some("100"));
    }

    #[test]
    fn test_limit_is_clamped() {
        let subject: Subject = "BTC/USDT".parse().unwrap();
        let request = BinanceAdapter::new().build_request(&subject, CandleInterval::OneDay, 5000);
        assert_eq!(request.get("limit"), Some("1000"));
    }

    #[test]
    fn test_map_row() {
        let row = vec![
            json!(1_499_040_000_000i64),
            json!("0.01634790"),
            json!("0.80000000"),
            json!("0.01575800"),
            json!("0.01577100"),
            json!("148976.11427815"),
            json!(1_499_644_799_999i64),
        ];
        let candle = BinanceAdapter::new().map_row(&row).unwrap();
        assert_eq!(candle.timestamp, 1_499_040_000_000);
        assert_eq!(candle.open, 0.0163479);
        assert_eq!(candle.close, 0.015771);
        assert_eq!(candle.volume, 148976.11427815);
    }

    #[test]
    fn test_parse_series() {
        let series = BinanceAdapter::new().parse(&body(25), 100).unwrap();
        assert_eq!(series.len(), 25);
        assert_eq!(series.last().close, 124.5);
    }

    #[test]
    fn test_parse_too_few_rows() {
        let err = BinanceAdapter::new().parse(&body(10), 100).unwrap_err();
        assert!(matches!(err, MarketDataError::InsufficientData { valid: 10, .. }));
    }

    #[test]
    fn test_parse_error_payload_is_malformed() {
        let err = BinanceAdapter::new()
            .parse(r#"{"code":-1121,"msg":"Invalid symbol."}"#, 100)
            .unwrap_err();
        assert!(matches!(err, MarketDataError::Malformed { .. }));
    }
}
