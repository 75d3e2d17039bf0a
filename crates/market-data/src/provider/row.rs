//! Helpers for mapping positional JSON rows into candles.
//!
//! Most exchanges return candles as arrays whose fields are a mix of JSON
//! numbers and numeric strings. A [`RowLayout`] names the position of each
//! field and the unit of the timestamp.

use serde_json::Value;

use crate::models::Candle;

/// Unit of the timestamp column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampUnit {
    Seconds,
    Millis,
}

/// Column positions of an array-shaped candle row.
#[derive(Clone, Copy, Debug)]
pub struct RowLayout {
    pub timestamp: usize,
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
    pub volume: usize,
    pub unit: TimestampUnit,
}

impl RowLayout {
    /// `[time, open, high, low, close, volume, ...]`
    pub const fn ohlcv(unit: TimestampUnit) -> Self {
        Self {
            timestamp: 0,
            open: 1,
            high: 2,
            low: 3,
            close: 4,
            volume: 5,
            unit,
        }
    }

    pub fn map(&self, row: &[Value]) -> Option<Candle> {
        let raw_ts = integer(row.get(self.timestamp)?)?;
        let timestamp = match self.unit {
            TimestampUnit::Seconds => raw_ts.checked_mul(1_000)?,
            TimestampUnit::Millis => raw_ts,
        };

        Some(Candle {
            timestamp,
            open: number(row.get(self.open)?)?,
            high: number(row.get(self.high)?)?,
            low: number(row.get(self.low)?)?,
            close: number(row.get(self.close)?)?,
            volume: number(row.get(self.volume)?)?,
        })
    }
}

/// A JSON number or a numeric string.
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A JSON integer or an integer string.
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_accepts_strings_and_numbers() {
        assert_eq!(number(&json!("42.5")), Some(42.5));
        assert_eq!(number(&json!(42.5)), Some(42.5));
        assert_eq!(number(&json!(null)), None);
        assert_eq!(number(&json!("abc")), None);
    }

    #[test]
    fn test_layout_scales_seconds() {
        let row = vec![
            json!(1_700_000_000),
            json!("1"),
            json!("2"),
            json!("0.5"),
            json!("1.5"),
            json!("10"),
        ];
        let candle = RowLayout::ohlcv(TimestampUnit::Seconds).map(&row).unwrap();
        assert_eq!(candle.timestamp, 1_700_000_000_000);
        assert_eq!(candle.close, 1.5);
        assert_eq!(candle.volume, 10.0);
    }

    #[test]
    fn test_layout_rejects_short_row() {
        let row = vec![json!(1), json!("1"), json!("2")];
        assert!(RowLayout::ohlcv(TimestampUnit::Millis).map(&row).is_none());
    }
}
