use std::time::Duration;

use candlewatch_market_data::{CandleInterval, MIN_SERIES_LEN};

pub struct Config {
    pub top_n: usize,
    pub quote_asset: String,
    pub scan_interval: Duration,
    pub candle_interval: CandleInterval,
    pub max_candles: usize,
    pub request_timeout: Duration,
    pub max_jitter: Duration,
    pub pacing: Duration,
    pub webhook_url: Option<String>,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let quote_asset = lookup("CW_QUOTE_ASSET")
            .map(|v| v.trim().to_ascii_uppercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "USDT".into());
        let candle_interval = lookup("CW_CANDLE_INTERVAL")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_default();
        let webhook_url = lookup("CW_WEBHOOK_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let log_format = lookup("CW_LOG_FORMAT").unwrap_or_else(|| "text".into());

        Self {
            top_n: parsed("CW_TOP_N", 20) as usize,
            quote_asset,
            scan_interval: Duration::from_secs(parsed("CW_SCAN_INTERVAL_SECS", 900).max(1)),
            candle_interval,
            max_candles: parsed("CW_MAX_CANDLES", 100).max(MIN_SERIES_LEN as u64) as usize,
            request_timeout: Duration::from_millis(parsed("CW_REQUEST_TIMEOUT_MS", 10_000)),
            max_jitter: Duration::from_millis(parsed("CW_MAX_JITTER_MS", 800)),
            pacing: Duration::from_millis(parsed("CW_PACING_MS", 300)),
            webhook_url,
            log_format,
        }
    }
}
