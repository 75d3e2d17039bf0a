use chrono::{DateTime, Utc};
use log::debug;
use rand::Rng;

use super::policy::SimulationPolicy;
use crate::models::{Candle, CandleInterval, CandleSeries, MIN_SERIES_LEN};

/// Which simulation produced a synthetic series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyntheticMode {
    /// No usable real history: random baseline with drift and noise.
    Cold,
    /// Projected forward from the last real series.
    Warm,
}

impl std::fmt::Display for SyntheticMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cold => write!(f, "cold"),
            Self::Warm => write!(f, "warm"),
        }
    }
}

/// Produces plausible canonical candles when no live data is available.
#[derive(Clone, Debug, Default)]
pub struct SyntheticGenerator {
    policy: SimulationPolicy,
    interval: CandleInterval,
}

/// Uniform sample from `[low, high)`, or `low` for an empty range.
fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

impl SyntheticGenerator {
    pub fn new(policy: SimulationPolicy, interval: CandleInterval) -> Self {
        Self { policy, interval }
    }

    pub fn policy(&self) -> &SimulationPolicy {
        &self.policy
    }

    /// Generate `length` candles (at least [`MIN_SERIES_LEN`]).
    ///
    /// Warm mode when `last_real` has at least `min_warm_candles` candles,
    /// cold mode otherwise. Never fails.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        last_real: Option<&CandleSeries>,
        length: usize,
        now: DateTime<Utc>,
    ) -> (SyntheticMode, CandleSeries) {
        let length = length.max(MIN_SERIES_LEN);

        match last_real {
            Some(real) if real.len() >= self.policy.min_warm_candles => {
                (SyntheticMode::Warm, self.warm(rng, real, length))
            }
            _ => (SyntheticMode::Cold, self.cold(rng, length, now)),
        }
    }

    fn warm<R: Rng + ?Sized>(&self, rng: &mut R, real: &CandleSeries, length: usize) -> CandleSeries {
        let p = &self.policy;
        let window = real.tail(p.trend_window.max(1));
        let n = window.len() as f64;

        let trend = window.iter().map(|c| c.close - c.open).sum::<f64>() / n;
        let avg_volume = window.iter().map(|c| c.volume).sum::<f64>() / n;

        let last = real.last();
        let step = match real.tail(2) {
            [prev, next] if next.timestamp > prev.timestamp => next.timestamp - prev.timestamp,
            _ => self.interval.duration_ms(),
        };
        let floor = last.close * p.price_floor;

        debug!(
            "Synthetic warm: last close {:.6}, trend {:.6}, avg volume {:.2}",
            last.close, trend, avg_volume
        );

        let mut prev_close = last.close;
        let candles = (1..=length)
            .map(|i| {
                let noise = last.close * uniform(rng, -p.warm_noise, p.warm_noise);
                let close = (last.close + i as f64 * trend * p.trend_dampening + noise).max(floor);
                let volume =
                    avg_volume.max(0.0) * uniform(rng, 1.0 - p.volume_jitter, 1.0 + p.volume_jitter);
                let candle = self.shape(rng, last.timestamp + i as i64 * step, prev_close, close, volume);
                prev_close = close;
                candle
            })
            .collect();

        CandleSeries::from_generated(candles)
    }

    fn cold<R: Rng + ?Sized>(&self, rng: &mut R, length: usize, now: DateTime<Utc>) -> CandleSeries {
        let p = &self.policy;
        let step = self.interval.duration_ms();
        let base = uniform(rng, p.cold_base_price.0, p.cold_base_price.1);
        let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let floor = base * p.price_floor;

        let end = now.timestamp_millis().div_euclid(step) * step;
        let start = end - (length as i64 - 1) * step;

        debug!(
            "Synthetic cold: base {:.4}, direction {}, {} candles",
            base, direction, length
        );

        let mut prev_close = base;
        let candles = (0..length)
            .map(|i| {
                let drift = direction * i as f64 * base * p.cold_drift;
                let noise = base * uniform(rng, -p.cold_noise, p.cold_noise);
                let close = (base + drift + noise).max(floor);
                let volume = uniform(rng, p.cold_volume.0, p.cold_volume.1);
                let candle = self.shape(rng, start + i as i64 * step, prev_close, close, volume);
                prev_close = close;
                candle
            })
            .collect();

        CandleSeries::from_generated(candles)
    }

    /// Build a candle around an open/close body with random wicks.
    fn shape<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        timestamp: i64,
        open: f64,
        close: f64,
        volume: f64,
    ) -> Candle {
        let upper = 1.0 + uniform(rng, 0.0, self.policy.wick);
        let lower = 1.0 - uniform(rng, 0.0, self.policy.wick);
        Candle {
            timestamp,
            open,
            high: open.max(close) * upper,
            low: open.min(close) * lower,
            close,
            volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 14, 37, 12).unwrap()
    }

    fn real_series(closes: &[f64]) -> CandleSeries {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                Candle::new(1_700_000_000_000 + i as i64 * 3_600_000, close - 1.0, close + 1.0, close - 2.0, close, 500.0)
            })
            .collect();
        CandleSeries::from_candles("TEST", candles).unwrap()
    }

    #[test]
    fn test_cold_start_without_history() {
        let generator = SyntheticGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);

        let (mode, series) = generator.generate(&mut rng, None, 50, now());
        assert_eq!(mode, SyntheticMode::Cold);
        assert_eq!(series.len(), 50);

        // Ends on the hour boundary at or before `now`
        let end = Utc.with_ymd_and_hms(2024, 5, 10, 14, 0, 0).unwrap();
        assert_eq!(series.last().timestamp, end.timestamp_millis());

        let policy = SimulationPolicy::default();
        for c in series.candles() {
            assert!(c.volume >= policy.cold_volume.0 && c.volume < policy.cold_volume.1);
            assert!(c.high >= c.close && c.low <= c.close);
        }
    }

    #[test]
    fn test_length_raised_to_minimum() {
        let generator = SyntheticGenerator::default();
        let mut rng = StdRng::seed_from_u64(1);
        let (_, series) = generator.generate(&mut rng, None, 3, now());
        assert_eq!(series.len(), MIN_SERIES_LEN);
    }

    #[test]
    fn test_warm_extrapolation_follows_trend() {
        // close - open is always 1.0, so trend = 1.0 and the dampened step is 0.02
        let closes: Vec<f64> = (0..30).map(|i| 200.0 + i as f64).collect();
        let real = real_series(&closes);

        let policy = SimulationPolicy {
            warm_noise: 0.0,
            volume_jitter: 0.0,
            ..SimulationPolicy::default()
        };
        let generator = SyntheticGenerator::new(policy, CandleInterval::OneHour);
        let mut rng = StdRng::seed_from_u64(42);

        let (mode, series) = generator.generate(&mut rng, Some(&real), 25, now());
        assert_eq!(mode, SyntheticMode::Warm);
        assert_eq!(series.len(), 25);

        let last_close = 229.0;
        for (i, c) in series.candles().iter().enumerate() {
            let expected = last_close + (i + 1) as f64 * 0.02;
            assert!((c.close - expected).abs() < 1e-9, "candle {}: {}", i, c.close);
            assert_eq!(c.volume, 500.0);
            assert_eq!(
                c.timestamp,
                real.last().timestamp + (i as i64 + 1) * 3_600_000
            );
        }
        assert_eq!(series.candles()[0].open, last_close);
    }

    #[test]
    fn test_warm_volume_within_jitter_band() {
        let closes: Vec<f64> = (0..20).map(|i| 50.0 + (i % 3) as f64).collect();
        let real = real_series(&closes);
        let generator = SyntheticGenerator::default();
        let mut rng = StdRng::seed_from_u64(99);

        let (_, series) = generator.generate(&mut rng, Some(&real), 40, now());
        for c in series.candles() {
            assert!(c.volume >= 400.0 && c.volume <= 600.0);
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let generator = SyntheticGenerator::default();
        let (_, a) = generator.generate(&mut StdRng::seed_from_u64(5), None, 30, now());
        let (_, b) = generator.generate(&mut StdRng::seed_from_u64(5), None, 30, now());
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_synthetic_series_is_canonical(seed in any::<u64>(), length in 0usize..400, warm in any::<bool>()) {
            let generator = SyntheticGenerator::default();
            let mut rng = StdRng::seed_from_u64(seed);
            let closes: Vec<f64> = (0..20).map(|i| 40.0 - i as f64 * 1.9).collect();
            let real = real_series(&closes);

            let (_, series) = generator.generate(&mut rng, warm.then_some(&real), length, now());

            prop_assert!(series.len() >= MIN_SERIES_LEN);
            prop_assert!(series.candles().iter().all(|c| c.is_valid()));
            prop_assert!(series.candles().windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        }
    }
}
