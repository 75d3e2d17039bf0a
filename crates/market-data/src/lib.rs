//! Candlewatch Market Data Crate
//!
//! This crate fetches OHLCV candles from public crypto exchange APIs and
//! keeps producing a usable series when some or all of them fail.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Nine exchange adapters normalizing divergent kline formats
//! - Concurrent provider races with deterministic, priority-ordered selection
//! - Circuit breaking for providers that keep failing
//! - Bounded degraded mode: cache reuse, then synthetic candles
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |     Subject      |  (BASE/QUOTE)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! | CandleAggregator | --> | CircuitBreaker   |
//! +------------------+     +------------------+
//!          |  races all providers, jittered
//!          v
//! +------------------+
//! |  HttpProvider<A> |  (one per exchange adapter)
//! +------------------+
//!          |  live result, or on total failure:
//!          v
//! +------------------+     +--------------------+
//! |   Mini-cache     | --> | SyntheticGenerator |
//! +------------------+     +--------------------+
//!          |
//!          v
//! +------------------+
//! |   FetchOutcome   |  (series + source + diagnostics)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Subject`] - Tracked instrument identity
//! - [`Candle`] / [`CandleSeries`] - Canonical candles and the validated series
//! - [`CandleAggregator`] - Provider race plus fallback chain
//! - [`FetchOutcome`] - Series returned by the aggregator and where it came from

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod synthetic;

// Re-export all public types from models
pub use models::{
    Candle, CandleInterval, CandleSeries, ProviderId, Subject, TimestampMs, MIN_SERIES_LEN,
};

pub use errors::{MarketDataError, RetryClass};

// Re-export provider types
pub use provider::{
    build_client, default_providers, BinanceTickerSource, CandleAdapter, HttpProvider,
    MarketDataProvider, TickerSource, TickerVolume, DEFAULT_REQUEST_TIMEOUT,
};

// Re-export registry types
pub use registry::{
    AggregatorConfig, CandleAggregator, CircuitBreaker, CircuitBreakerConfig, CircuitState,
    DegradedState, FallbackPolicy, FetchDiagnostics, FetchOutcome, ProviderAttempt, SeriesSource,
};

pub use synthetic::{SimulationPolicy, SyntheticGenerator, SyntheticMode};
