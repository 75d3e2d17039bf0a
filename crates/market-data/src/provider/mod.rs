//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `CandleAdapter` trait each exchange implements (request building
//!   and row mapping)
//! - The `MarketDataProvider` trait the aggregator races
//! - `HttpProvider`, the shared HTTP transport with deadline handling
//! - Nine exchange adapters and the Binance 24h ticker source
//!
//! # Priority
//!
//! [`default_providers`] returns the providers in their fixed priority order.
//! When several succeed in the same race, the first one in this order wins.

mod http;
pub(crate) mod row;
mod traits;

pub mod binance;
pub mod bitget;
pub mod bybit;
pub mod gateio;
pub mod htx;
pub mod kraken;
pub mod kucoin;
pub mod mexc;
pub mod okx;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

pub use binance::{BinanceAdapter, BinanceTickerSource};
pub use bitget::BitgetAdapter;
pub use bybit::BybitAdapter;
pub use gateio::GateIoAdapter;
pub use htx::HtxAdapter;
pub use http::{build_client, HttpProvider, DEFAULT_REQUEST_TIMEOUT};
pub use kraken::KrakenAdapter;
pub use kucoin::KucoinAdapter;
pub use mexc::MexcAdapter;
pub use okx::OkxAdapter;
pub use traits::{CandleAdapter, MarketDataProvider, ProviderRequest, TickerSource, TickerVolume};

/// All nine exchange providers in priority order, sharing one HTTP client.
pub fn default_providers(client: Client, timeout: Duration) -> Vec<Arc<dyn MarketDataProvider>> {
    fn http<A: CandleAdapter>(
        adapter: A,
        client: &Client,
        timeout: Duration,
    ) -> Arc<dyn MarketDataProvider> {
        Arc::new(HttpProvider::new(adapter, client.clone(), timeout))
    }

    vec![
        http(BinanceAdapter::new(), &client, timeout),
        http(BybitAdapter::new(), &client, timeout),
        http(OkxAdapter::new(), &client, timeout),
        http(KucoinAdapter::new(), &client, timeout),
        http(GateIoAdapter::new(), &client, timeout),
        http(MexcAdapter::new(), &client, timeout),
        http(BitgetAdapter::new(), &client, timeout),
        http(KrakenAdapter::new(), &client, timeout),
        http(HtxAdapter::new(), &client, timeout),
    ]
}
