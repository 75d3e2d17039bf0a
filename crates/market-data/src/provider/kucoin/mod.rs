//! KuCoin spot candles.
//!
//! `GET /api/v1/market/candles` has no row-count parameter and returns up to
//! 1500 rows newest first; the series is trimmed after normalisation.
//! Columns are ordered open, close, high, low (not OHLC) and the time is in
//! seconds.
//! API documentation: https://www.kucoin.com/docs/rest/spot-trading/market-data/get-klines

use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{Candle, CandleInterval, Subject};
use crate::provider::row::{RowLayout, TimestampUnit};
use crate::provider::{CandleAdapter, ProviderRequest};

const BASE_URL: &str = "https://api.kucoin.com";
const PROVIDER_ID: &str = "KUCOIN";
const SUCCESS_CODE: &str = "200000";

/// `[time, open, close, high, low, volume, turnover]`
const LAYOUT: RowLayout = RowLayout {
    timestamp: 0,
    open: 1,
    close: 2,
    high: 3,
    low: 4,
    volume: 5,
    unit: TimestampUnit::Seconds,
};

#[derive(Debug, Deserialize)]
pub struct CandlesResponse {
    code: String,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

/// KuCoin spot candles adapter.
#[derive(Clone, Debug, Default)]
pub struct KucoinAdapter;

impl KucoinAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn interval_token(interval: CandleInterval) -> &'static str {
    match interval {
        CandleInterval::FifteenMinutes => "15min",
        CandleInterval::OneHour => "1hour",
        CandleInterval::FourHours => "4hour",
        CandleInterval::OneDay => "1day",
    }
}

impl CandleAdapter for KucoinAdapter {
    type Response = CandlesResponse;
    type Row = Vec<Value>;

    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        4
    }

    fn build_request(
        &self,
        subject: &Subject,
        interval: CandleInterval,
        _limit: usize,
    ) -> ProviderRequest {
        ProviderRequest::new(format!("{}/api/v1/market/candles", BASE_URL))
            .param("symbol", subject.joined("-"))
            .param("type", interval_token(interval))
    }

    fn rows(&self, response: Self::Response) -> Result<Vec<Self::Row>, MarketDataError> {
        if response.code != SUCCESS_CODE {
            return Err(MarketDataError::Malformed {
                provider: PROVIDER_ID.to_string(),
                message: format!(
                    "code {}: {}",
                    response.code,
                    response.msg.unwrap_or_default()
                ),
            });
        }
        Ok(response.data)
    }

    fn map_row(&self, row: &Self::Row) -> Option<Candle> {
        LAYOUT.map(row)
    }
}
