//! Webhook delivery of signals.

use async_trait::async_trait;
use candlewatch_core::{Error, Result, Signal, SignalNotifier};
use reqwest::{Client, Url};
use serde::Serialize;

/// JSON body posted for each signal.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: String,
    used_fallback: bool,
    signal: &'a Signal,
}

impl<'a> From<&'a Signal> for WebhookPayload<'a> {
    fn from(signal: &'a Signal) -> Self {
        Self {
            text: signal.message(),
            used_fallback: signal.used_fallback,
            signal,
        }
    }
}

/// Posts each signal as JSON to a webhook (chat relay, email bridge, ...).
/// Retries are the receiver's business.
pub struct WebhookNotifier {
    client: Client,
    url: Url,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl SignalNotifier for WebhookNotifier {
    async fn notify(&self, signal: &Signal) -> Result<()> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&WebhookPayload::from(signal))
            .send()
            .await
            .map_err(|e| Error::Notification(format!("Webhook request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Notification(format!(
                "Webhook returned HTTP {} - {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        tracing::debug!("Delivered signal for {} to webhook", signal.subject);
        Ok(())
    }
}
