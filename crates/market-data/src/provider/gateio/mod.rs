//! Gate.io v4 spot candlesticks.
//!
//! `GET /api/v4/spot/candlesticks` returns oldest first with the time in
//! seconds. The second column is quote volume; base volume sits at index 6.
//! API documentation: https://www.gate.io/docs/developers/apiv4/#market-candlesticks

use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{Candle, CandleInterval, Subject};
use crate::provider::row::{RowLayout, TimestampUnit};
use crate::provider::{CandleAdapter, ProviderRequest};

const BASE_URL: &str = "https://api.gateio.ws";
const PROVIDER_ID: &str = "GATEIO";
const MAX_LIMIT: usize = 1000;

/// `[time, quote_volume, close, high, low, open, base_volume, window_closed]`
const LAYOUT: RowLayout = RowLayout {
    timestamp: 0,
    close: 2,
    high: 3,
    low: 4,
    open: 5,
    volume: 6,
    unit: TimestampUnit::Seconds,
};

/// Gate.io spot candlesticks adapter.
#[derive(Clone, Debug, Default)]
pub struct GateIoAdapter;

impl GateIoAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl CandleAdapter for GateIoAdapter {
    type Response = Vec<Vec<Value>>;
    type Row = Vec<Value>;

    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        5
    }

    fn build_request(
        &self,
        subject: &Subject,
        interval: CandleInterval,
        limit: usize,
    ) -> ProviderRequest {
        // Gate.io spells intervals the same way as the canonical form
        ProviderRequest::new(format!("{}/api/v4/spot/candlesticks", BASE_URL))
            .param("currency_pair", subject.joined("_"))
            .param("interval", interval.as_str())
            .param("limit", limit.clamp(1, MAX_LIMIT))
    }

    fn rows(&self, response: Self::Response) -> Result<Vec<Self::Row>, MarketDataError> {
        Ok(response)
    }

    fn map_row(&self, row: &Self::Row) -> Option<Candle> {
        LAYOUT.map(row)
    }
}
