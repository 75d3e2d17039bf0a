use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// A tradable pair tracked independently for fetch, cache and synthetic state.
///
/// The canonical spelling is `BASE/QUOTE` in upper case (e.g. `BTC/USDT`).
/// Providers each spell the pair differently; the helpers below produce the
/// common variants so adapters don't re-parse the string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject {
    base: String,
    quote: String,
}

impl Subject {
    /// Create a subject from its two legs.
    pub fn new(base: &str, quote: &str) -> Result<Self, MarketDataError> {
        let base = base.trim().to_ascii_uppercase();
        let quote = quote.trim().to_ascii_uppercase();

        let valid_leg =
            |leg: &str| !leg.is_empty() && leg.chars().all(|c| c.is_ascii_alphanumeric());

        if !valid_leg(&base) || !valid_leg(&quote) {
            return Err(MarketDataError::InvalidSubject(format!("{}/{}", base, quote)));
        }

        Ok(Self { base, quote })
    }

    /// Base asset, e.g. `BTC`.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote asset, e.g. `USDT`.
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Both legs concatenated: `BTCUSDT`.
    pub fn concatenated(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// Both legs joined with a separator: `BTC-USDT`, `BTC_USDT`.
    pub fn joined(&self, separator: &str) -> String {
        format!("{}{}{}", self.base, separator, self.quote)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Subject {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s
            .split_once('/')
            .ok_or_else(|| MarketDataError::InvalidSubject(s.to_string()))?;
        Self::new(base, quote)
    }
}

impl TryFrom<String> for Subject {
    type Error = MarketDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Subject> for String {
    fn from(subject: Subject) -> Self {
        subject.to_string()
    }
}
