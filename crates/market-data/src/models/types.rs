use std::borrow::Cow;

/// Provider identifier - static constants like "BINANCE", "OKX"
pub type ProviderId = Cow<'static, str>;

/// Candle open time in milliseconds since the Unix epoch
pub type TimestampMs = i64;
