/// Tuning constants of the candle simulation.
///
/// Relative values are fractions of the reference price (e.g. `0.002` is
/// 0.2%). Ranges are `(low, high)` with `low < high`.
///
/// Warm extrapolation (at least `min_warm_candles` real candles):
///
/// ```text
/// trend   = mean(close - open) over the last `trend_window` real candles
/// close_i = last_close + i * trend * trend_dampening + last_close * U(-warm_noise, warm_noise)
/// volume  = mean(volume) over the same window * U(1 - volume_jitter, 1 + volume_jitter)
/// ```
///
/// Cold start:
///
/// ```text
/// base    = U(cold_base_price)
/// close_i = base + direction * i * base * cold_drift + base * U(-cold_noise, cold_noise)
/// volume  = U(cold_volume)
/// ```
///
/// In both modes `open_i` is the previous close, wicks extend up to `wick`
/// beyond the body, and no close falls below `price_floor` times the
/// reference price.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationPolicy {
    pub min_warm_candles: usize,
    pub trend_window: usize,
    pub trend_dampening: f64,
    pub warm_noise: f64,
    pub volume_jitter: f64,
    pub cold_base_price: (f64, f64),
    pub cold_drift: f64,
    pub cold_noise: f64,
    pub cold_volume: (f64, f64),
    pub wick: f64,
    pub price_floor: f64,
}

impl Default for SimulationPolicy {
    fn default() -> Self {
        Self {
            min_warm_candles: 5,
            trend_window: 5,
            trend_dampening: 0.02,
            warm_noise: 0.002,
            volume_jitter: 0.2,
            cold_base_price: (1.0, 1_000.0),
            cold_drift: 0.001,
            cold_noise: 0.005,
            cold_volume: (1_000.0, 100_000.0),
            wick: 0.002,
            price_floor: 0.01,
        }
    }
}
