//! Core error types for the Candlewatch scanner.

use candlewatch_market_data::MarketDataError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for a scan.
///
/// Every variant is scoped to one subject or one cycle; none of them is
/// meant to stop the periodic driver.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Insufficient data for {subject}: {len} candles")]
    InsufficientData { subject: String, len: usize },

    #[error("Notification failed: {0}")]
    Notification(String),
}

impl Error {
    /// True when the subject simply has no usable data this cycle.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. }
                | Self::MarketData(MarketDataError::Exhausted { .. })
                | Self::MarketData(MarketDataError::InsufficientData { .. })
        )
    }
}
