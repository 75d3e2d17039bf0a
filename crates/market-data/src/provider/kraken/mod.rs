//! Kraken public OHLC.
//!
//! `GET /0/public/OHLC` returns up to 720 rows under `result.<pair>`, where
//! the key is Kraken's own spelling of the pair, alongside a `last` cursor.
//! Kraken names bitcoin `XBT`. Errors arrive in the `error` array with HTTP 200.
//! API documentation: https://docs.kraken.com/api/docs/rest-api/get-ohlc-data

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::MarketDataError;
use crate::models::{Candle, CandleInterval, Subject};
use crate::provider::row::{RowLayout, TimestampUnit};
use crate::provider::{CandleAdapter, ProviderRequest};

const BASE_URL: &str = "https://api.kraken.com";
const PROVIDER_ID: &str = "KRAKEN";

/// `[time, open, high, low, close, vwap, volume, count]`
const LAYOUT: RowLayout = RowLayout {
    timestamp: 0,
    open: 1,
    high: 2,
    low: 3,
    close: 4,
    volume: 6,
    unit: TimestampUnit::Seconds,
};

#[derive(Debug, Deserialize)]
pub struct OhlcResponse {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: Map<String, Value>,
}

/// Kraken OHLC adapter.
#[derive(Clone, Debug, Default)]
pub struct KrakenAdapter;

impl KrakenAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Kraken asset spelling.
fn asset_code(asset: &str) -> &str {
    match asset {
        "BTC" => "XBT",
        "DOGE" => "XDG",
        other => other,
    }
}

impl CandleAdapter for KrakenAdapter {
    type Response = OhlcResponse;
    type Row = Vec<Value>;

    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        8
    }

    fn build_request(
        &self,
        subject: &Subject,
        interval: CandleInterval,
        _limit: usize,
    ) -> ProviderRequest {
        let pair = format!(
            "{}{}",
            asset_code(subject.base()),
            asset_code(subject.quote())
        );
        ProviderRequest::new(format!("{}/0/public/OHLC", BASE_URL))
            .param("pair", pair)
            .param("interval", interval.minutes())
    }

    fn rows(&self, response: Self::Response) -> Result<Vec<Self::Row>, MarketDataError> {
        if !response.error.is_empty() {
            return Err(MarketDataError::Malformed {
                provider: PROVIDER_ID.to_string(),
                message: response.error.join("; "),
            });
        }

        let rows = response
            .result
            .into_iter()
            .find(|(key, _)| key != "last")
            .map(|(_, value)| value)
            .ok_or_else(|| MarketDataError::Malformed {
                provider: PROVIDER_ID.to_string(),
                message: "No pair entry in result".to_string(),
            })?;

        serde_json::from_value(rows).map_err(|e| MarketDataError::Malformed {
            provider: PROVIDER_ID.to_string(),
            message: format!("Unexpected OHLC rows: {}", e),
        })
    }

    fn map_row(&self, row: &Self::Row) -> Option<Candle> {
        LAYOUT.map(row)
    }
}
