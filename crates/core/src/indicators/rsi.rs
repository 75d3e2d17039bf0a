/// Relative strength index with Wilder smoothing.
///
/// The first `period` differences seed the average gain and loss as plain
/// means; every later difference is folded in with weight `1 / period`.
/// A zero average loss yields 100.
///
/// Returns `None` when `period` is zero or there are fewer than
/// `period + 1` closes.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() <= period {
        return None;
    }

    let w = period as f64;
    let mut diffs = closes.windows(2).map(|pair| pair[1] - pair[0]);

    let (mut avg_gain, mut avg_loss) = diffs
        .by_ref()
        .take(period)
        .fold((0.0, 0.0), |(gain, loss), change| {
            (gain + change.max(0.0), loss + (-change).max(0.0))
        });
    avg_gain /= w;
    avg_loss /= w;

    for change in diffs {
        avg_gain = (avg_gain * (w - 1.0) + change.max(0.0)) / w;
        avg_loss = (avg_loss * (w - 1.0) + (-change).max(0.0)) / w;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
