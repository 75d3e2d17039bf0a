use std::sync::Arc;

use candlewatch_core::{LogNotifier, Scanner, ScannerConfig, SignalNotifier};
use candlewatch_market_data::{
    build_client, default_providers, AggregatorConfig, BinanceTickerSource, CandleAggregator,
    CircuitBreaker,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::notifier::WebhookNotifier;

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Wire providers, aggregator, ticker source and notifier into a scanner.
pub fn build_scanner(config: &Config) -> anyhow::Result<Arc<Scanner>> {
    let client = build_client(config.request_timeout);

    let providers = default_providers(client.clone(), config.request_timeout);
    tracing::info!(
        "Registered {} candle providers, {} candles of {} per subject",
        providers.len(),
        config.max_candles,
        config.candle_interval
    );

    let aggregator = CandleAggregator::with_config(
        providers,
        AggregatorConfig {
            interval: config.candle_interval,
            max_candles: config.max_candles,
            max_jitter: config.max_jitter,
            request_timeout: config.request_timeout,
            ..AggregatorConfig::default()
        },
        CircuitBreaker::new(),
    );

    let notifier: Arc<dyn SignalNotifier> = match &config.webhook_url {
        Some(url) => {
            tracing::info!("Signals are delivered to the configured webhook");
            Arc::new(WebhookNotifier::new(client.clone(), url.parse()?))
        }
        None => {
            tracing::info!("CW_WEBHOOK_URL not set, signals are only logged");
            Arc::new(LogNotifier)
        }
    };

    let tickers = Arc::new(BinanceTickerSource::new(client, config.request_timeout));

    Ok(Arc::new(Scanner::new(
        Arc::new(aggregator),
        tickers,
        notifier,
        ScannerConfig {
            quote_asset: config.quote_asset.clone(),
            pacing: config.pacing,
        },
    )))
}
