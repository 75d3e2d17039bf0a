//! Signals emitted by the scanner and their delivery.

mod dedup;
mod notifier;

pub use dedup::{SignalDeduplicator, DEFAULT_RETENTION_DAYS};
pub use notifier::{LogNotifier, SignalNotifier};

use candlewatch_market_data::Subject;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::indicators::{Analysis, Direction};

/// An alert for one subject.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub subject: Subject,
    pub direction: Direction,
    pub score: f64,
    pub rsi: f64,
    pub sma20: f64,
    pub volatility: f64,
    pub last_close: f64,
    /// The series came from the cache or the synthetic generator.
    pub used_fallback: bool,
    /// Where the series came from, e.g. `live:BINANCE` or `synthetic:cold`.
    pub source: String,
    pub generated_at: DateTime<Utc>,
}

impl Signal {
    /// Build a signal from an analysis with a direction. `None` when the
    /// analysis carries no bias.
    pub fn from_analysis(
        subject: Subject,
        analysis: &Analysis,
        used_fallback: bool,
        source: impl Into<String>,
        generated_at: DateTime<Utc>,
    ) -> Option<Self> {
        Some(Self {
            subject,
            direction: analysis.direction?,
            score: analysis.score,
            rsi: analysis.rsi,
            sma20: analysis.sma20,
            volatility: analysis.volatility,
            last_close: analysis.last_close,
            used_fallback,
            source: source.into(),
            generated_at,
        })
    }

    /// Plain-text alert body.
    pub fn message(&self) -> String {
        let mut text = format!(
            "{} {} (score {:.4})\nRSI(14): {:.2} | SMA20: {} | Volatility: {:.2}%\nLast close: {}\nSource: {}\nTime: {}",
            self.subject,
            self.direction,
            self.score,
            self.rsi,
            format_price(self.sma20),
            self.volatility * 100.0,
            format_price(self.last_close),
            self.source,
            self.generated_at.format("%Y-%m-%d %H:%M UTC"),
        );
        if self.used_fallback {
            text.push_str("\nWarning: degraded data, not a live market read");
        }
        text
    }
}

/// Enough significant digits for both BTC and sub-cent tokens.
fn format_price(value: f64) -> String {
    if value >= 1.0 {
        format!("{:.4}", value)
    } else {
        format!("{:.8}", value)
    }
}
