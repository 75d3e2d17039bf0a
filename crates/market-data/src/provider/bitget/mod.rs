//! Bitget v2 spot candles.
//!
//! `GET /api/v2/spot/market/candles`, oldest first, all fields strings.
//! A `code` other than "00000" signals an error.
//! API documentation: https://www.bitget.com/api-doc/spot/market/Get-Candle-Data

use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{Candle, CandleInterval, Subject};
use crate::provider::row::{RowLayout, TimestampUnit};
use crate::provider::{CandleAdapter, ProviderRequest};

const BASE_URL: &str = "https://api.bitget.com";
const PROVIDER_ID: &str = "BITGET";
const SUCCESS_CODE: &str = "00000";
const MAX_LIMIT: usize = 1000;

/// `[ts, open, high, low, close, baseVolume, usdtVolume, quoteVolume]`
const LAYOUT: RowLayout = RowLayout::ohlcv(TimestampUnit::Millis);

#[derive(Debug, Deserialize)]
pub struct CandlesResponse {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Option<Vec<Vec<Value>>>,
}

/// Bitget spot candles adapter.
#[derive(Clone, Debug, Default)]
pub struct BitgetAdapter;

impl BitgetAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn interval_token(interval: CandleInterval) -> &'static str {
    match interval {
        CandleInterval::FifteenMinutes => "15min",
        CandleInterval::OneHour => "1h",
        CandleInterval::FourHours => "4h",
        CandleInterval::OneDay => "1day",
    }
}

impl CandleAdapter for BitgetAdapter {
    type Response = CandlesResponse;
    type Row = Vec<Value>;

    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        7
    }

    fn build_request(
        &self,
        subject: &Subject,
        interval: CandleInterval,
        limit: usize,
    ) -> ProviderRequest {
        ProviderRequest::new(format!("{}/api/v2/spot/market/candles", BASE_URL))
            .param("symbol", subject.concatenated())
            .param("granularity", interval_token(interval))
            .param("limit", limit.clamp(1, MAX_LIMIT))
    }

    fn rows(&self, response: Self::Response) -> Result<Vec<Self::Row>, MarketDataError> {
        if response.code != SUCCESS_CODE {
            return Err(MarketDataError::Malformed {
                provider: PROVIDER_ID.to_string(),
                message: format!("code {}: {}", response.code, response.msg),
            });
        }
        Ok(response.data.unwrap_or_default())
    }

    fn map_row(&self, row: &Self::Row) -> Option<Candle> {
        LAYOUT.map(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_request() {
        let subject: Subject = "BTC/USDT".parse().unwrap();
        let request = BitgetAdapter::new().build_request(&subject, CandleInterval::OneDay, 50);

        assert_eq!(request.get("symbol"), Some("BTCUSDT"));
        assert_eq!(request.get("granularity"), Some("1day"));
        assert_eq!(request.get("limit"), Some("50"));
    }

    #[test]
    fn test_parse_series() {
        let data: Vec<Value> = (0..21)
            .map(|i| {
                json!([
                    (1_695_835_800_000i64 + i * 3_600_000).to_string(),
                    "26210.5",
                    "26210.5",
                    "26194.5",
                    "26194.5",
                    "26.26",
                    "687897.63",
                    "687897.63"
                ])
            })
            .collect();
        let body = json!({ "code": "00000", "msg": "success", "requestTime": 1_695_865_615_662i64, "data": data })
            .to_string();

        let series = BitgetAdapter::new().parse(&body, 100).unwrap();
        assert_eq!(series.len(), 21);
        assert_eq!(series.last().close, 26194.5);
        assert_eq!(series.last().volume, 26.26);
    }

    #[test]
    fn test_error_code_is_malformed() {
        let body = r#"{"code":"40034","msg":"Parameter does not exist","requestTime":1,"data":null}"#;
        let err = BitgetAdapter::new().parse(body, 100).unwrap_err();
        assert!(matches!(err, MarketDataError::Malformed { .. }));
    }
}
