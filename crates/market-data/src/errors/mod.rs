//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for circuit breaker bookkeeping

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Provider-level variants (`Transport`, `Timeout`, `Malformed`, `Rejected`,
/// `RateLimited`, `CircuitOpen`, `InsufficientData`) are swallowed by the aggregator and
/// reduced to "no result" for that provider. `Exhausted` is what the aggregator
/// itself returns when every fallback tier is denied.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// Connection failure or non-success HTTP status.
    #[error("Transport error: {provider} - {message}")]
    Transport {
        /// The provider that failed
        provider: String,
        /// Description of the failure
        message: String,
    },

    /// The request exceeded its deadline and was cancelled.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The response did not match the provider's expected schema.
    #[error("Malformed response: {provider} - {message}")]
    Malformed {
        /// The provider that returned the response
        provider: String,
        /// What did not match
        message: String,
    },

    /// The provider refused this request with a 4xx status, typically
    /// because it does not list the subject.
    #[error("Rejected by {provider}: HTTP {status} - {message}")]
    Rejected {
        /// The provider that refused the request
        provider: String,
        /// HTTP status code
        status: u16,
        /// Excerpt of the response body
        message: String,
    },

    /// The provider rate limited the request (HTTP 429 / 418).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The circuit breaker is open for this provider.
    #[error("Circuit open: {provider}")]
    CircuitOpen {
        /// The provider with an open circuit
        provider: String,
    },

    /// Fewer valid candles than a usable series needs.
    #[error("Insufficient data from {provider}: {valid} valid candles, {required} required")]
    InsufficientData {
        /// The provider (or "SYNTHETIC") that produced the rows
        provider: String,
        /// Number of rows that survived filtering
        valid: usize,
        /// Minimum series length
        required: usize,
    },

    /// Live, cache and synthetic tiers were all denied for this subject.
    #[error("All fallback tiers exhausted for {subject}")]
    Exhausted {
        /// The subject that is unavailable this cycle
        subject: String,
    },

    /// The subject identifier could not be parsed.
    #[error("Invalid subject: {0}")]
    InvalidSubject(String),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use candlewatch_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::Timeout { provider: "BINANCE".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::FailoverWithPenalty);
    ///
    /// let error = MarketDataError::Exhausted { subject: "BTC/USDT".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } | Self::RateLimited { .. } => {
                RetryClass::FailoverWithPenalty
            }

            Self::Malformed { .. } | Self::Rejected { .. } | Self::InsufficientData { .. } => {
                RetryClass::NextProvider
            }

            Self::CircuitOpen { .. } => RetryClass::CircuitOpen,

            Self::Exhausted { .. } | Self::InvalidSubject(_) => RetryClass::Never,
        }
    }

    /// Short, stable label for diagnostics and log summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Malformed { .. } => "malformed",
            Self::Rejected { .. } => "rejected",
            Self::RateLimited { .. } => "rate_limited",
            Self::CircuitOpen { .. } => "circuit_open",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::Exhausted { .. } => "exhausted",
            Self::InvalidSubject(_) => "invalid_subject",
        }
    }
}
