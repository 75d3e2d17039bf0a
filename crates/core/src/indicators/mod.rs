//! Indicator engine.
//!
//! Scores a close series with a fixed heuristic:
//!
//! ```text
//! score = 0.5 + 0.35 * rsi14 / 100 + 0.3 * last_close / sma20 + 0.2 * volatility5
//! ```
//!
//! `score > 0.78` is a long bias, `score > 0.72` a short bias, anything lower
//! produces no signal. The weights are part of the alert contract and must
//! not be tuned.

mod rsi;
mod trend;

pub use rsi::rsi;
pub use trend::{sma, volatility};

use candlewatch_market_data::MIN_SERIES_LEN;
use serde::{Deserialize, Serialize};

pub const RSI_PERIOD: usize = 14;
pub const SMA_PERIOD: usize = 20;
pub const VOLATILITY_LOOKBACK: usize = 5;

pub const LONG_THRESHOLD: f64 = 0.78;
pub const SHORT_THRESHOLD: f64 = 0.72;

/// Bias of a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

/// Indicator values and the composite score of one series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Analysis {
    pub score: f64,
    pub direction: Option<Direction>,
    pub rsi: f64,
    pub sma20: f64,
    pub volatility: f64,
    pub last_close: f64,
}

/// Composite score from the three indicators.
pub fn composite_score(rsi: f64, last_close: f64, sma20: f64, volatility: f64) -> f64 {
    0.5 + 0.35 * (rsi / 100.0) + 0.3 * (last_close / sma20) + 0.2 * volatility
}

/// Map a score to a bias, `None` at or below the short threshold.
pub fn direction_for(score: f64) -> Option<Direction> {
    if score > LONG_THRESHOLD {
        Some(Direction::Long)
    } else if score > SHORT_THRESHOLD {
        Some(Direction::Short)
    } else {
        None
    }
}

/// Analyze a close series, most recent last.
///
/// Returns `None` when there are fewer than [`MIN_SERIES_LEN`] closes.
pub fn analyze(closes: &[f64]) -> Option<Analysis> {
    if closes.len() < MIN_SERIES_LEN {
        return None;
    }

    let last_close = *closes.last()?;
    let rsi = rsi(closes, RSI_PERIOD)?;
    let sma20 = sma(closes, SMA_PERIOD)?;
    let volatility = volatility(closes, VOLATILITY_LOOKBACK)?;

    let score = composite_score(rsi, last_close, sma20, volatility);

    Some(Analysis {
        score,
        direction: direction_for(score),
        rsi,
        sma20,
        volatility,
        last_close,
    })
}
