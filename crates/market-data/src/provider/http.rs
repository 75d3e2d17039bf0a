//! HTTP transport shared by every exchange adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::traits::{CandleAdapter, MarketDataProvider, ProviderRequest};
use crate::errors::MarketDataError;
use crate::models::{CandleInterval, CandleSeries, Subject};

/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("candlewatch/", env!("CARGO_PKG_VERSION"));

/// Longest error body excerpt kept in a `Transport` message.
const MAX_ERROR_BODY: usize = 200;

/// Build the HTTP client shared by all providers.
pub fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Classify a non-success response.
///
/// 429 and 418 (Binance's ban after repeated 429s) are rate limiting, other
/// 4xx mean this provider refused the subject, anything else is transport.
fn status_error(provider: &str, status: StatusCode, body: &str) -> MarketDataError {
    let excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();

    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
        MarketDataError::RateLimited {
            provider: provider.to_string(),
        }
    } else if status.is_client_error() {
        MarketDataError::Rejected {
            provider: provider.to_string(),
            status: status.as_u16(),
            message: excerpt,
        }
    } else {
        MarketDataError::Transport {
            provider: provider.to_string(),
            message: format!("HTTP {} - {}", status, excerpt),
        }
    }
}

/// Turns a [`CandleAdapter`] into a [`MarketDataProvider`] that talks HTTP.
///
/// The whole exchange (connect, send, read body) runs under one deadline.
/// When it expires the in-flight future is dropped, which cancels the
/// request, and the result is `Timeout`.
pub struct HttpProvider<A> {
    adapter: A,
    client: Client,
    timeout: Duration,
}

impl<A: CandleAdapter> HttpProvider<A> {
    pub fn new(adapter: A, client: Client, timeout: Duration) -> Self {
        Self {
            adapter,
            client,
            timeout,
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Issue the request and return the body of a successful response.
    async fn send(&self, request: &ProviderRequest) -> Result<String, MarketDataError> {
        let provider = self.adapter.id();

        debug!(
            "{} request: {} with {} params",
            provider,
            request.url,
            request.query.len()
        );

        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: provider.to_string(),
                    }
                } else {
                    MarketDataError::Transport {
                        provider: provider.to_string(),
                        message: format!("Request failed: {}", e),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(provider, status, &body));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: provider.to_string(),
                }
            } else {
                MarketDataError::Transport {
                    provider: provider.to_string(),
                    message: format!("Failed to read response: {}", e),
                }
            }
        })
    }
}

#[async_trait]
impl<A: CandleAdapter> MarketDataProvider for HttpProvider<A> {
    fn id(&self) -> &'static str {
        self.adapter.id()
    }

    fn priority(&self) -> u8 {
        self.adapter.priority()
    }

    async fn fetch_candles(
        &self,
        subject: &Subject,
        interval: CandleInterval,
        max_candles: usize,
    ) -> Result<CandleSeries, MarketDataError> {
        let request = self.adapter.build_request(subject, interval, max_candles);

        let body = match tokio::time::timeout(self.timeout, self.send(&request)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(MarketDataError::Timeout {
                    provider: self.adapter.id().to_string(),
                })
            }
        };

        let series = self.adapter.parse(&body, max_candles)?;

        debug!(
            "{}: fetched {} candles for {} ({})",
            self.adapter.id(),
            series.len(),
            subject,
            interval
        );

        Ok(series)
    }
}
