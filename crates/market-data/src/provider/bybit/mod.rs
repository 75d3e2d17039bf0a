//! Bybit v5 spot klines.
//!
//! `GET /v5/market/kline?category=spot` returns rows newest first inside
//! `result.list`. A non-zero `retCode` is an error even with HTTP 200.
//! API documentation: https://bybit-exchange.github.io/docs/v5/market/kline

use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{Candle, CandleInterval, Subject};
use crate::provider::row::{RowLayout, TimestampUnit};
use crate::provider::{CandleAdapter, ProviderRequest};

const BASE_URL: &str = "https://api.bybit.com";
const PROVIDER_ID: &str = "BYBIT";
const MAX_LIMIT: usize = 1000;

/// `[startTime, open, high, low, close, volume, turnover]`, all strings
const LAYOUT: RowLayout = RowLayout::ohlcv(TimestampUnit::Millis);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KlineResponse {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    #[serde(default)]
    result: Option<KlineResult>,
}

#[derive(Debug, Deserialize)]
pub struct KlineResult {
    #[serde(default)]
    list: Vec<Vec<Value>>,
}

/// Bybit spot klines adapter.
#[derive(Clone, Debug, Default)]
pub struct BybitAdapter;

impl BybitAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn interval_token(interval: CandleInterval) -> &'static str {
    match interval {
        CandleInterval::FifteenMinutes => "15",
        CandleInterval::OneHour => "60",
        CandleInterval::FourHours => "240",
        CandleInterval::OneDay => "D",
    }
}

impl CandleAdapter for BybitAdapter {
    type Response = KlineResponse;
    type Row = Vec<Value>;

    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    fn build_request(
        &self,
        subject: &Subject,
        interval: CandleInterval,
        limit: usize,
    ) -> ProviderRequest {
        ProviderRequest::new(format!("{}/v5/market/kline", BASE_URL))
            .param("category", "spot")
            .param("symbol", subject.concatenated())
            .param("interval", interval_token(interval))
            .param("limit", limit.clamp(1, MAX_LIMIT))
    }

    fn rows(&self, response: Self::Response) -> Result<Vec<Self::Row>, MarketDataError> {
        if response.ret_code != 0 {
            return Err(MarketDataError::Malformed {
                provider: PROVIDER_ID.to_string(),
                message: format!("retCode {}: {}", response.ret_code, response.ret_msg),
            });
        }

        Ok(response.result.map(|r| r.list).unwrap_or_default())
    }

    fn map_row(&self, row: &Self::Row) -> Option<Candle> {
        LAYOUT.map(row)
    }
}
