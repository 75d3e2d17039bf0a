//! OKX v5 market candles.
//!
//! `GET /api/v5/market/candles` returns at most 300 rows, newest first.
//! Errors come back with HTTP 200 and a non-"0" `code`.
//! API documentation: https://www.okx.com/docs-v5/en/#public-data-rest-api-get-candlesticks

use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{Candle, CandleInterval, Subject};
use crate::provider::row::{RowLayout, TimestampUnit};
use crate::provider::{CandleAdapter, ProviderRequest};

const BASE_URL: &str = "https://www.okx.com";
const PROVIDER_ID: &str = "OKX";
const MAX_LIMIT: usize = 300;

/// `[ts, o, h, l, c, vol, volCcy, volCcyQuote, confirm]`
const LAYOUT: RowLayout = RowLayout::ohlcv(TimestampUnit::Millis);

#[derive(Debug, Deserialize)]
pub struct CandlesResponse {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

/// OKX spot candles adapter.
#[derive(Clone, Debug, Default)]
pub struct OkxAdapter;

impl OkxAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn interval_token(interval: CandleInterval) -> &'static str {
    match interval {
        CandleInterval::FifteenMinutes => "15m",
        CandleInterval::OneHour => "1H",
        CandleInterval::FourHours => "4H",
        CandleInterval::OneDay => "1Dutc",
    }
}

impl CandleAdapter for OkxAdapter {
    type Response = CandlesResponse;
    type Row = Vec<Value>;

    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        3
    }

    fn build_request(
        &self,
        subject: &Subject,
        interval: CandleInterval,
        limit: usize,
    ) -> ProviderRequest {
        ProviderRequest::new(format!("{}/api/v5/market/candles", BASE_URL))
            .param("instId", subject.joined("-"))
            .param("bar", interval_token(interval))
            .param("limit", limit.clamp(1, MAX_LIMIT))
    }

    fn rows(&self, response: Self::Response) -> Result<Vec<Self::Row>, MarketDataError> {
        if response.code != "0" {
            return Err(MarketDataError::Malformed {
                provider: PROVIDER_ID.to_string(),
                message: format!("code {}: {}", response.code, response.msg),
            });
        }
        Ok(response.data)
    }

    fn map_row(&self, row: &Self::Row) -> Option<Candle> {
        LAYOUT.map(row)
    }
}
