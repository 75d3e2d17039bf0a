use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::Subject;
use crate::provider::row::number;
use crate::provider::{TickerSource, TickerVolume};

const BASE_URL: &str = "https://api.binance.com";
const SOURCE_ID: &str = "BINANCE_TICKER";

/// Leveraged token suffixes; these track a multiple of the base asset and
/// would duplicate the underlying in the ranking. A base only counts as
/// leveraged when the remainder is itself a listed base.
const LEVERAGED_SUFFIXES: &[&str] = &["UP", "DOWN", "BULL", "BEAR"];

/// Response item from /api/v3/ticker/24hr
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    symbol: String,
    /// Quote-asset volume, as a decimal string
    quote_volume: serde_json::Value,
}

/// 24h ticker statistics from Binance spot.
pub struct BinanceTickerSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl BinanceTickerSource {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
            timeout,
        }
    }

    async fn fetch_body(&self) -> Result<String, MarketDataError> {
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: SOURCE_ID.to_string(),
                }
            } else {
                MarketDataError::Transport {
                    provider: SOURCE_ID.to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: SOURCE_ID.to_string(),
            });
        }
        if !status.is_success() {
            return Err(MarketDataError::Transport {
                provider: SOURCE_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::Transport {
                provider: SOURCE_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })
    }
}

/// Keep pairs quoted in `quote_asset`, skipping leveraged tokens and rows
/// whose volume can't be read.
fn parse_volumes(body: &str, quote_asset: &str) -> Result<Vec<TickerVolume>, MarketDataError> {
    let tickers: Vec<Ticker24h> =
        serde_json::from_str(body).map_err(|e| MarketDataError::Malformed {
            provider: SOURCE_ID.to_string(),
            message: format!("Failed to parse ticker response: {}", e),
        })?;

    let quote_asset = quote_asset.to_ascii_uppercase();

    let quoted: Vec<(&str, &serde_json::Value)> = tickers
        .iter()
        .filter_map(|ticker| {
            let base = ticker.symbol.strip_suffix(quote_asset.as_str())?;
            (!base.is_empty()).then_some((base, &ticker.quote_volume))
        })
        .collect();
    let bases: HashSet<&str> = quoted.iter().map(|(base, _)| *base).collect();

    let volumes = quoted
        .iter()
        .filter(|(base, _)| !is_leveraged(base, &bases))
        .filter_map(|(base, volume)| {
            let subject = Subject::new(base, &quote_asset).ok()?;
            let quote_volume = number(volume)?;
            Some(TickerVolume {
                subject,
                quote_volume,
            })
        })
        .collect();

    Ok(volumes)
}

/// `BTCUP` is leveraged when `BTC` trades too; `JUP` is not.
fn is_leveraged(base: &str, bases: &HashSet<&str>) -> bool {
    LEVERAGED_SUFFIXES.iter().any(|suffix| {
        base.strip_suffix(suffix)
            .is_some_and(|underlying| underlying.len() >= 2 && bases.contains(underlying))
    })
}

#[async_trait]
impl TickerSource for BinanceTickerSource {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn fetch_volumes(&self, quote_asset: &str) -> Result<Vec<TickerVolume>, MarketDataError> {
        let body = match tokio::time::timeout(self.timeout, self.fetch_body()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(MarketDataError::Timeout {
                    provider: SOURCE_ID.to_string(),
                })
            }
        };

        let volumes = parse_volumes(&body, quote_asset)?;
        debug!("Binance: {} tickers quoted in {}", volumes.len(), quote_asset);
        Ok(volumes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"[
        {"symbol":"BTCUSDT","priceChange":"-94.99","lastPrice":"43210.00","volume":"24000.1","quoteVolume":"1040000000.50"},
        {"symbol":"ETHBTC","priceChange":"0.0001","lastPrice":"0.052","volume":"5000","quoteVolume":"260.1"},
        {"symbol":"ETHUSDT","priceChange":"3.1","lastPrice":"2300.10","volume":"200000","quoteVolume":"460000000.00"},
        {"symbol":"BTCUPUSDT","priceChange":"0","lastPrice":"10","volume":"1","quoteVolume":"999999999999"},
        {"symbol":"USDT","priceChange":"0","lastPrice":"1","volume":"1","quoteVolume":"1"},
        {"symbol":"DOGEUSDT","priceChange":"0","lastPrice":"0.08","volume":"1","quoteVolume":"not-a-number"}
    ]"#;

    #[test]
    fn test_parse_volumes_filters_quote_and_leveraged() {
        let volumes = parse_volumes(BODY, "usdt").unwrap();
        let names: Vec<String> = volumes.iter().map(|v| v.subject.to_string()).collect();
        assert_eq!(names, vec!["BTC/USDT", "ETH/USDT"]);
        assert_eq!(volumes[0].quote_volume, 1_040_000_000.5);
    }

    #[test]
    fn test_parse_volumes_keeps_bases_ending_in_suffix_letters() {
        let body = r#"[
            {"symbol":"JUPUSDT","quoteVolume":"52000000.0"},
            {"symbol":"SYRUPUSDT","quoteVolume":"8000000.0"},
            {"symbol":"ETHBEARUSDT","quoteVolume":"1000.0"},
            {"symbol":"ETHUSDT","quoteVolume":"460000000.0"},
            {"symbol":"BTCUPUSDT","quoteVolume":"999999999999"}
        ]"#;

        let volumes = parse_volumes(body, "USDT").unwrap();
        let names: Vec<String> = volumes.iter().map(|v| v.subject.to_string()).collect();
        // BTCUP survives because BTC itself is not listed in this body
        assert_eq!(names, vec!["JUP/USDT", "SYRUP/USDT", "ETH/USDT", "BTCUP/USDT"]);
    }

    #[test]
    fn test_parse_volumes_malformed() {
        let err = parse_volumes(r#"{"code":-1003}"#, "USDT").unwrap_err();
        assert!(matches!(err, MarketDataError::Malformed { .. }));
    }
}
