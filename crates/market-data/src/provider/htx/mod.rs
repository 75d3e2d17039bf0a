//! HTX (formerly Huobi) market history klines.
//!
//! `GET /market/history/kline` returns objects rather than arrays, newest
//! first, with `id` as the open time in seconds. Symbols are lower case.
//! API documentation: https://www.htx.com/en-us/opend/newApiPages/?id=7ec4a4da-7773-11ed-9966-0242ac110003

use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{Candle, CandleInterval, Subject};
use crate::provider::{CandleAdapter, ProviderRequest};

const BASE_URL: &str = "https://api.huobi.pro";
const PROVIDER_ID: &str = "HTX";
const MAX_SIZE: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct KlineResponse {
    status: String,
    #[serde(default, rename = "err-msg")]
    err_msg: Option<String>,
    #[serde(default)]
    data: Option<Vec<KlineRow>>,
}

/// One kline object.
#[derive(Debug, Deserialize)]
pub struct KlineRow {
    /// Open time in seconds
    id: i64,
    open: f64,
    close: f64,
    high: f64,
    low: f64,
    /// Volume in base currency
    amount: f64,
}

/// HTX klines adapter.
#[derive(Clone, Debug, Default)]
pub struct HtxAdapter;

impl HtxAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn interval_token(interval: CandleInterval) -> &'static str {
    match interval {
        CandleInterval::FifteenMinutes => "15min",
        CandleInterval::OneHour => "60min",
        CandleInterval::FourHours => "4hour",
        CandleInterval::OneDay => "1day",
    }
}

impl CandleAdapter for HtxAdapter {
    type Response = KlineResponse;
    type Row = KlineRow;

    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        9
    }

    fn build_request(
        &self,
        subject: &Subject,
        interval: CandleInterval,
        limit: usize,
    ) -> ProviderRequest {
        ProviderRequest::new(format!("{}/market/history/kline", BASE_URL))
            .param("symbol", subject.concatenated().to_ascii_lowercase())
            .param("period", interval_token(interval))
            .param("size", limit.clamp(1, MAX_SIZE))
    }

    fn rows(&self, response: Self::Response) -> Result<Vec<Self::Row>, MarketDataError> {
        if response.status != "ok" {
            return Err(MarketDataError::Malformed {
                provider: PROVIDER_ID.to_string(),
                message: response
                    .err_msg
                    .unwrap_or_else(|| format!("status {}", response.status)),
            });
        }
        Ok(response.data.unwrap_or_default())
    }

    fn map_row(&self, row: &Self::Row) -> Option<Candle> {
        Some(Candle {
            timestamp: row.id.checked_mul(1_000)?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.amount,
        })
    }
}
