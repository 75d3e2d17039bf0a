use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Spacing between consecutive candles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleInterval {
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl CandleInterval {
    /// Candle spacing in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        const MINUTE: i64 = 60_000;
        match self {
            Self::FifteenMinutes => 15 * MINUTE,
            Self::OneHour => 60 * MINUTE,
            Self::FourHours => 240 * MINUTE,
            Self::OneDay => 1_440 * MINUTE,
        }
    }

    /// Canonical short form (`15m`, `1h`, `4h`, `1d`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FifteenMinutes => "15m",
            Self::OneHour => "1h",
            Self::FourHours => "4h",
            Self::OneDay => "1d",
        }
    }

    /// Spacing in whole minutes.
    pub fn minutes(&self) -> i64 {
        self.duration_ms() / 60_000
    }
}

impl fmt::Display for CandleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandleInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "15m" => Ok(Self::FifteenMinutes),
            "1h" | "60m" => Ok(Self::OneHour),
            "4h" => Ok(Self::FourHours),
            "1d" | "24h" => Ok(Self::OneDay),
            other => Err(format!("Unsupported candle interval: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_one_hour() {
        assert_eq!(CandleInterval::default(), CandleInterval::OneHour);
        assert_eq!(CandleInterval::default().duration_ms(), 3_600_000);
    }

    #[test]
    fn test_parse() {
        assert_eq!("4H".parse::<CandleInterval>(), Ok(CandleInterval::FourHours));
        assert_eq!("60m".parse::<CandleInterval>(), Ok(CandleInterval::OneHour));
        assert!("3m".parse::<CandleInterval>().is_err());
    }

    #[test]
    fn test_minutes() {
        assert_eq!(CandleInterval::FifteenMinutes.minutes(), 15);
        assert_eq!(CandleInterval::OneDay.minutes(), 1_440);
    }
}
