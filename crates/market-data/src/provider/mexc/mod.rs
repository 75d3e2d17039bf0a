//! MEXC spot v3 klines.
//!
//! Binance-compatible row shape, but MEXC spells the hourly interval `60m`
//! and caps `limit` at 1000.
//! API documentation: https://mexcdevelop.github.io/apidocs/spot_v3_en/#kline-candlestick-data

use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{Candle, CandleInterval, Subject};
use crate::provider::row::{RowLayout, TimestampUnit};
use crate::provider::{CandleAdapter, ProviderRequest};

const BASE_URL: &str = "https://api.mexc.com";
const PROVIDER_ID: &str = "MEXC";
const MAX_LIMIT: usize = 1000;

/// `[openTime, open, high, low, close, volume, closeTime, quoteVolume]`
const LAYOUT: RowLayout = RowLayout::ohlcv(TimestampUnit::Millis);

/// MEXC spot klines adapter.
#[derive(Clone, Debug, Default)]
pub struct MexcAdapter;

impl MexcAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn interval_token(interval: CandleInterval) -> &'static str {
    match interval {
        CandleInterval::FifteenMinutes => "15m",
        CandleInterval::OneHour => "60m",
        CandleInterval::FourHours => "4h",
        CandleInterval::OneDay => "1d",
    }
}

impl CandleAdapter for MexcAdapter {
    type Response = Vec<Vec<Value>>;
    type Row = Vec<Value>;

    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        6
    }

    fn build_request(
        &self,
        subject: &Subject,
        interval: CandleInterval,
        limit: usize,
    ) -> ProviderRequest {
        ProviderRequest::new(format!("{}/api/v3/klines", BASE_URL))
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
