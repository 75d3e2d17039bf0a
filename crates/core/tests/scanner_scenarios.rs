//! End-to-end scenarios: mock providers -> aggregator -> indicators -> signals.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use candlewatch_core::market_data::{
    AggregatorConfig, Candle, CandleAggregator, CandleInterval, CandleSeries, CircuitBreaker,
    MarketDataError, MarketDataProvider, SeriesSource, SimulationPolicy, Subject,
    SyntheticGenerator, SyntheticMode, TickerSource, TickerVolume,
};
use candlewatch_core::{analyze, Error, Result, Scanner, ScannerConfig, Signal, SignalNotifier};
use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

// =============================================================================
// Test doubles
// =============================================================================

const PROVIDER_IDS: [&str; 9] = [
    "BINANCE", "BYBIT", "OKX", "KUCOIN", "GATEIO", "MEXC", "BITGET", "KRAKEN", "HTX",
];

/// Rising closes: always scores as a long bias.
fn rising_series(len: usize) -> CandleSeries {
    let candles = (0..len)
        .map(|i| {
            let close = 50.0 + i as f64;
            Candle::new(
                1_714_000_000_000 + i as i64 * 3_600_000,
                close - 0.5,
                close + 0.5,
                close - 1.0,
                close,
                1_000.0,
            )
        })
        .collect();
    CandleSeries::from_candles("MOCK", candles).unwrap()
}

struct MockProvider {
    id: &'static str,
    priority: u8,
    healthy: AtomicBool,
    candles: usize,
    calls: AtomicUsize,
}

impl MockProvider {
    fn failing(id: &'static str, priority: u8) -> Self {
        Self {
            id,
            priority,
            healthy: AtomicBool::new(false),
            candles: 0,
            calls: AtomicUsize::new(0),
        }
    }

    fn serving(id: &'static str, priority: u8, candles: usize) -> Self {
        Self {
            healthy: AtomicBool::new(true),
            candles,
            ..Self::failing(id, priority)
        }
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    async fn fetch_candles(
        &self,
        _subject: &Subject,
        _interval: CandleInterval,
        _max_candles: usize,
    ) -> std::result::Result<CandleSeries, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(rising_series(self.candles))
        } else {
            Err(MarketDataError::Transport {
                provider: self.id.to_string(),
                message: "connection refused".to_string(),
            })
        }
    }
}

#[derive(Default)]
struct RecordingNotifier {
    signals: Mutex<Vec<Signal>>,
}

impl RecordingNotifier {
    fn signals(&self) -> Vec<Signal> {
        self.signals.lock().unwrap().clone()
    }
}

#[async_trait]
impl SignalNotifier for RecordingNotifier {
    async fn notify(&self, signal: &Signal) -> Result<()> {
        self.signals.lock().unwrap().push(signal.clone());
        Ok(())
    }
}

struct BrokenNotifier;

#[async_trait]
impl SignalNotifier for BrokenNotifier {
    async fn notify(&self, _signal: &Signal) -> Result<()> {
        Err(Error::Notification("relay unreachable".to_string()))
    }
}

struct StaticTickers(Vec<&'static str>);

#[async_trait]
impl TickerSource for StaticTickers {
    fn id(&self) -> &'static str {
        "STATIC"
    }

    async fn fetch_volumes(
        &self,
        _quote_asset: &str,
    ) -> std::result::Result<Vec<TickerVolume>, MarketDataError> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Ok(TickerVolume {
                    subject: name.parse()?,
                    quote_volume: 1.0e9 / (i as f64 + 1.0),
                })
            })
            .collect()
    }
}

fn aggregator(providers: Vec<Arc<MockProvider>>) -> Arc<CandleAggregator> {
    seeded_aggregator(providers, None)
}

fn seeded_aggregator(
    providers: Vec<Arc<MockProvider>>,
    synthetic_seed: Option<u64>,
) -> Arc<CandleAggregator> {
    let providers: Vec<Arc<dyn MarketDataProvider>> = providers
        .into_iter()
        .map(|p| p as Arc<dyn MarketDataProvider>)
        .collect();
    let config = AggregatorConfig {
        max_jitter: Duration::ZERO,
        synthetic_seed,
        ..AggregatorConfig::default()
    };
    Arc::new(CandleAggregator::with_config(
        providers,
        config,
        CircuitBreaker::new(),
    ))
}

fn all_failing() -> Vec<Arc<MockProvider>> {
    PROVIDER_IDS
        .iter()
        .enumerate()
        .map(|(i, id)| Arc::new(MockProvider::failing(*id, i as u8 + 1)))
        .collect()
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 25, 12, 0, 0).unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_unknown_subject_falls_back_to_cold_synthetic() {
    for seed in [1_u64, 7, 42, 2024] {
        let providers = all_failing();
        let notifier = Arc::new(RecordingNotifier::default());
        let scanner = Scanner::new(
            seeded_aggregator(providers.clone(), Some(seed)),
            Arc::new(StaticTickers(vec![])),
            notifier.clone(),
            ScannerConfig::default(),
        );
        let subject: Subject = "XYZ/USDT".parse().unwrap();

        // The series the aggregator will serve for this seed
        let generator =
            SyntheticGenerator::new(SimulationPolicy::default(), CandleInterval::default());
        let (mode, expected) = generator.generate(
            &mut StdRng::seed_from_u64(seed),
            None,
            AggregatorConfig::default().max_candles,
            noon(),
        );
        assert_eq!(mode, SyntheticMode::Cold);
        let analysis = analyze(&expected.closes()).unwrap();
        assert!(analysis.score.is_finite());
        assert!(analysis.score >= 0.0);

        let emitted = scanner.analyze_at(&subject, noon()).await.unwrap();

        // Every provider was tried exactly once
        assert!(providers.iter().all(|p| p.calls.load(Ordering::SeqCst) == 1));

        let signals = notifier.signals();
        if analysis.score > 0.72 {
            assert!(emitted, "seed {} scored {}", seed, analysis.score);
            assert_eq!(signals.len(), 1);
            let signal = &signals[0];
            assert!(signal.used_fallback);
            assert_eq!(signal.score, analysis.score);
            assert_eq!(signal.source, "synthetic:cold");
            assert!(signal.message().contains("degraded data"));
        } else {
            assert!(!emitted);
            assert!(signals.is_empty());
        }

        // The synthetic streak is used up, so the next analysis is unavailable
        let err = scanner.analyze_at(&subject, noon()).await.unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(notifier.signals().len(), signals.len());
    }
}

#[tokio::test]
async fn test_single_live_provider_is_returned_unchanged() {
    let mut providers = all_failing();
    providers[4] = Arc::new(MockProvider::serving("GATEIO", 5, 25));
    let agg = aggregator(providers);
    let subject: Subject = "SOL/USDT".parse().unwrap();

    let outcome = agg.fetch_at(&subject, noon()).await.unwrap();

    assert_eq!(outcome.series, rising_series(25));
    assert_eq!(
        outcome.source,
        SeriesSource::Live {
            provider: "GATEIO".into()
        }
    );
    assert!(!outcome.used_fallback());
    assert_eq!(outcome.diagnostics.attempts.len(), 9);
    assert_eq!(outcome.diagnostics.success_count(), 1);
    assert_eq!(agg.cached(&subject), Some(rising_series(25)));
    assert_eq!(agg.degraded_state(&subject).unwrap().consecutive_synthetic, 0);
}

#[tokio::test]
async fn test_provider_recovery_resets_synthetic_streak() {
    let flaky = Arc::new(MockProvider::serving("BYBIT", 2, 25));
    flaky.healthy.store(false, Ordering::SeqCst);
    let mut providers = all_failing();
    providers[1] = flaky.clone();
    let agg = aggregator(providers);
    let subject: Subject = "SOL/USDT".parse().unwrap();

    let outcome = agg.fetch_at(&subject, noon()).await.unwrap();
    assert!(outcome.used_fallback());
    assert_eq!(agg.degraded_state(&subject).unwrap().consecutive_synthetic, 1);

    flaky.healthy.store(true, Ordering::SeqCst);
    let outcome = agg.fetch_at(&subject, noon()).await.unwrap();

    assert_eq!(outcome.series, rising_series(25));
    assert_eq!(
        outcome.source,
        SeriesSource::Live {
            provider: "BYBIT".into()
        }
    );
    assert_eq!(agg.cached(&subject), Some(rising_series(25)));
    let state = agg.degraded_state(&subject).unwrap();
    assert_eq!(state.consecutive_synthetic, 0);
    assert_eq!(state.last_real, Some(rising_series(25)));
}

#[tokio::test]
async fn test_one_signal_per_subject_per_day() {
    let providers = vec![Arc::new(MockProvider::serving("BINANCE", 1, 60))];
    let notifier = Arc::new(RecordingNotifier::default());
    let scanner = Scanner::new(
        aggregator(providers),
        Arc::new(StaticTickers(vec![])),
        notifier.clone(),
        ScannerConfig::default(),
    );
    let subject: Subject = "BTC/USDT".parse().unwrap();

    assert!(scanner.analyze_at(&subject, noon()).await.unwrap());
    assert!(!scanner
        .analyze_at(&subject, noon() + chrono::Duration::hours(6))
        .await
        .unwrap());

    let next_day = Utc.with_ymd_and_hms(2024, 4, 26, 0, 0, 1).unwrap();
    assert!(scanner.analyze_at(&subject, next_day).await.unwrap());

    let signals = notifier.signals();
    assert_eq!(signals.len(), 2);
    assert!(signals.iter().all(|s| !s.used_fallback));
    assert_eq!(signals[0].source, "live:BINANCE");
}

#[tokio::test]
async fn test_notifier_failure_still_counts_as_emitted() {
    let providers = vec![Arc::new(MockProvider::serving("OKX", 3, 40))];
    let scanner = Scanner::new(
        aggregator(providers),
        Arc::new(StaticTickers(vec![])),
        Arc::new(BrokenNotifier),
        ScannerConfig::default(),
    );
    let subject: Subject = "ETH/USDT".parse().unwrap();

    assert!(scanner.analyze_at(&subject, noon()).await.unwrap());
    assert!(!scanner.analyze_at(&subject, noon()).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_cycle_continues_past_unavailable_subjects() {
    let providers = all_failing();
    let notifier = Arc::new(RecordingNotifier::default());
    let scanner = Scanner::new(
        aggregator(providers),
        Arc::new(StaticTickers(vec!["BTC/USDT", "ETH/USDT", "SOL/USDT"])),
        notifier.clone(),
        ScannerConfig::default(),
    );

    // First cycle: each subject gets its one synthetic series
    let first = scanner.run_cycle(10).await.unwrap();
    assert_eq!(first.ranked, 3);
    assert_eq!(first.analyzed, 3);
    assert_eq!(first.unavailable, 0);
    assert_eq!(first.emitted, notifier.signals().len());

    // Second cycle: no live data, no cache, synthetic streak used up
    let second = scanner.run_cycle(10).await.unwrap();
    assert_eq!(second.ranked, 3);
    assert_eq!(second.analyzed, 0);
    assert_eq!(second.unavailable, 3);
    assert_eq!(second.failed, 0);
    assert_eq!(second.emitted, 0);
}

#[tokio::test(start_paused = true)]
async fn test_cycle_emits_for_live_subjects() {
    let providers = vec![Arc::new(MockProvider::serving("BINANCE", 1, 100))];
    let notifier = Arc::new(RecordingNotifier::default());
    let scanner = Scanner::new(
        aggregator(providers),
        Arc::new(StaticTickers(vec!["BTC/USDT", "ETH/USDT"])),
        notifier.clone(),
        ScannerConfig::default(),
    );

    let day_before = Utc::now().date_naive();
    let first = scanner.run_cycle(2).await.unwrap();
    let second = scanner.run_cycle(2).await.unwrap();
    let day_after = Utc::now().date_naive();

    assert_eq!(first.emitted, 2);
    assert_eq!(second.analyzed, 2);
    if day_before == day_after {
        assert_eq!(second.emitted, 0);
    }
    let names: Vec<String> = notifier
        .signals()
        .iter()
        .take(2)
        .map(|s| s.subject.to_string())
        .collect();
    assert_eq!(names, vec!["BTC/USDT", "ETH/USDT"]);
}
