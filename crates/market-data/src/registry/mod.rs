//! Provider orchestration.
//!
//! This module provides:
//! - Concurrent provider races with priority-ordered selection
//! - Circuit breaking for providers that keep failing
//! - Degraded-mode quotas for cached and synthetic fallbacks
//! - Per-fetch diagnostics

mod aggregator;
mod circuit_breaker;
mod degraded;
mod diagnostics;

pub use aggregator::{AggregatorConfig, CandleAggregator, FetchOutcome, SeriesSource};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use degraded::{DegradedState, FallbackPolicy};
pub use diagnostics::{AttemptOutcome, FetchDiagnostics, ProviderAttempt};
