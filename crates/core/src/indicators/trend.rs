/// Mean of the last `period` closes.
pub fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Absolute relative change between the last close and the close
/// `lookback` periods before it.
pub fn volatility(closes: &[f64], lookback: usize) -> Option<f64> {
    let last = *closes.last()?;
    let index = closes.len().checked_sub(lookback + 1)?;
    let reference = closes[index];
    if reference == 0.0 {
        return None;
    }
    Some((last / reference - 1.0).abs())
}
