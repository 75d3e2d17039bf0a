//! Candle aggregator racing every provider for a subject.
//!
//! One `fetch` call:
//! 1. Starts all providers concurrently, each after its own random jitter
//! 2. Waits for all of them to settle
//! 3. Picks the first success in priority order (not arrival order)
//! 4. Falls back to the cache, then to synthetic data, within the quotas
//!    of [`FallbackPolicy`]

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::degraded::{DegradedState, FallbackPolicy};
use super::{CircuitBreaker, FetchDiagnostics};
use crate::errors::{MarketDataError, RetryClass};
use crate::models::{CandleInterval, CandleSeries, ProviderId, Subject};
use crate::provider::{MarketDataProvider, DEFAULT_REQUEST_TIMEOUT};
use crate::synthetic::{SimulationPolicy, SyntheticGenerator, SyntheticMode};

/// Tunables of the aggregator.
#[derive(Clone, Debug)]
pub struct AggregatorConfig {
    pub interval: CandleInterval,
    /// Candles requested from each provider.
    pub max_candles: usize,
    /// Upper bound of the random delay before each provider request.
    pub max_jitter: Duration,
    /// Deadline for a single provider, jitter excluded.
    pub request_timeout: Duration,
    pub fallback: FallbackPolicy,
    pub simulation: SimulationPolicy,
    /// Seed for synthetic generation; `None` seeds from OS entropy.
    pub synthetic_seed: Option<u64>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            interval: CandleInterval::default(),
            max_candles: 100,
            max_jitter: Duration::from_millis(800),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            fallback: FallbackPolicy::default(),
            simulation: SimulationPolicy::default(),
            synthetic_seed: None,
        }
    }
}

/// Where the series of a [`FetchOutcome`] came from.
#[derive(Clone, Debug, PartialEq)]
pub enum SeriesSource {
    /// Fresh data from this provider.
    Live { provider: ProviderId },
    /// The last live series, served for the `reuse`-th time in a row.
    Cached { reuse: u32 },
    /// Generated data.
    Synthetic { mode: SyntheticMode },
}

impl std::fmt::Display for SeriesSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live { provider } => write!(f, "live:{}", provider),
            Self::Cached { reuse } => write!(f, "cache#{}", reuse),
            Self::Synthetic { mode } => write!(f, "synthetic:{}", mode),
        }
    }
}

/// Result of a successful aggregated fetch.
#[derive(Clone, Debug)]
pub struct FetchOutcome {
    pub series: CandleSeries,
    pub source: SeriesSource,
    pub diagnostics: FetchDiagnostics,
}

impl FetchOutcome {
    /// True when the series is not fresh live data.
    pub fn used_fallback(&self) -> bool {
        !matches!(self.source, SeriesSource::Live { .. })
    }
}

/// Races providers and owns the per-subject cache and degraded-mode state.
pub struct CandleAggregator {
    providers: Vec<Arc<dyn MarketDataProvider>>,
    config: AggregatorConfig,
    circuit_breaker: CircuitBreaker,
    generator: SyntheticGenerator,
    synthetic_rng: Mutex<StdRng>,
    states: Mutex<HashMap<Subject, DegradedState>>,
    cache: Mutex<HashMap<Subject, CandleSeries>>,
    subject_locks: Mutex<HashMap<Subject, Arc<tokio::sync::Mutex<()>>>>,
}

impl CandleAggregator {
    /// Create an aggregator with default configuration.
    pub fn new(providers: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        Self::with_config(providers, AggregatorConfig::default(), CircuitBreaker::new())
    }

    /// Create an aggregator with custom configuration.
    ///
    /// Providers are ordered by priority; equal priorities keep the order given.
    pub fn with_config(
        mut providers: Vec<Arc<dyn MarketDataProvider>>,
        config: AggregatorConfig,
        circuit_breaker: CircuitBreaker,
    ) -> Self {
        providers.sort_by_key(|p| p.priority());
        let generator = SyntheticGenerator::new(config.simulation, config.interval);
        let synthetic_rng = match config.synthetic_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            providers,
            config,
            circuit_breaker,
            generator,
            synthetic_rng: Mutex::new(synthetic_rng),
            states: Mutex::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
            subject_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Provider ids in selection order.
    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// The cached live series for `subject`, if any.
    pub fn cached(&self, subject: &Subject) -> Option<CandleSeries> {
        self.lock_cache().get(subject).cloned()
    }

    /// Snapshot of the degraded-mode state of `subject`, if it was ever fetched.
    pub fn degraded_state(&self, subject: &Subject) -> Option<DegradedState> {
        self.lock_states().get(subject).cloned()
    }

    /// Fetch a usable series for `subject`.
    pub async fn fetch(&self, subject: &Subject) -> Result<FetchOutcome, MarketDataError> {
        self.fetch_at(subject, Utc::now()).await
    }

    /// Same as [`fetch`](Self::fetch) with an explicit wall clock for the
    /// synthetic quota window.
    ///
    /// Fails with [`MarketDataError::Exhausted`] when live, cache and
    /// synthetic tiers are all denied.
    pub async fn fetch_at(
        &self,
        subject: &Subject,
        now: DateTime<Utc>,
    ) -> Result<FetchOutcome, MarketDataError> {
        let subject_lock = self.subject_lock(subject);
        let _guard = subject_lock.lock().await;

        let (live, diagnostics) = self.race(subject).await;
        debug!("Fetch {}: {}", subject, diagnostics.summary());

        let mut states = self.lock_states();
        let state = states.entry(subject.clone()).or_default();

        if let Some((provider, series)) = live {
            state.record_live_success(&series);
            self.lock_cache().insert(subject.clone(), series.clone());
            return Ok(FetchOutcome {
                series,
                source: SeriesSource::Live { provider },
                diagnostics,
            });
        }

        let policy = &self.config.fallback;

        if let Some(cached) = self.cached(subject) {
            if state.try_reuse_cache(policy) {
                warn!(
                    "All providers failed for {}, reusing cached series ({}/{})",
                    subject, state.cached_uses, policy.max_cache_reuses
                );
                return Ok(FetchOutcome {
                    series: cached,
                    source: SeriesSource::Cached {
                        reuse: state.cached_uses,
                    },
                    diagnostics,
                });
            }
        }

        if state.try_reserve_synthetic(now, policy) {
            let (mode, series) = self.generator.generate(
                &mut *self.lock_rng(),
                state.last_real.as_ref(),
                self.config.max_candles,
                now,
            );
            warn!(
                "All providers failed for {}, serving {} synthetic candles ({})",
                subject,
                series.len(),
                mode
            );
            return Ok(FetchOutcome {
                series,
                source: SeriesSource::Synthetic { mode },
                diagnostics,
            });
        }

        info!(
            "{} unavailable this cycle: cache reuses {}, synthetic streak {}, window count {}",
            subject,
            state.cached_uses,
            state.consecutive_synthetic,
            state.window_count()
        );
        Err(MarketDataError::Exhausted {
            subject: subject.to_string(),
        })
    }

    /// Run every provider once and pick the winner.
    async fn race(&self, subject: &Subject) -> (Option<(ProviderId, CandleSeries)>, FetchDiagnostics) {
        // ThreadRng is not Send; draw all delays before the first await.
        let delays: Vec<Duration> = {
            let mut rng = rand::thread_rng();
            let max = self.config.max_jitter.as_millis() as u64;
            self.providers
                .iter()
                .map(|_| Duration::from_millis(rng.gen_range(0..=max)))
                .collect()
        };

        let attempts = self
            .providers
            .iter()
            .zip(delays)
            .map(|(provider, delay)| self.attempt(provider.as_ref(), subject, delay));
        let results = join_all(attempts).await;

        let mut diagnostics = FetchDiagnostics::new();
        let mut winner: Option<(ProviderId, CandleSeries)> = None;

        for (provider, result) in self.providers.iter().zip(results) {
            let provider_id: ProviderId = Cow::Borrowed(provider.id());
            match result {
                Ok(series) => {
                    self.circuit_breaker.record_success(provider.id());
                    diagnostics.record_success(provider_id.clone(), series.len());
                    if winner.is_none() {
                        winner = Some((provider_id, series));
                    }
                }
                Err(e) => {
                    if e.retry_class() == RetryClass::FailoverWithPenalty {
                        self.circuit_breaker.record_failure(provider.id());
                    }
                    debug!("Provider '{}' failed for {}: {}", provider_id, subject, e);
                    diagnostics.record_error(provider_id, &e);
                }
            }
        }

        (winner, diagnostics)
    }

    async fn attempt(
        &self,
        provider: &dyn MarketDataProvider,
        subject: &Subject,
        delay: Duration,
    ) -> Result<CandleSeries, MarketDataError> {
        if !self.circuit_breaker.is_allowed(provider.id()) {
            return Err(MarketDataError::CircuitOpen {
                provider: provider.id().to_string(),
            });
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let fetch = provider.fetch_candles(subject, self.config.interval, self.config.max_candles);
        match tokio::time::timeout(self.config.request_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout {
                provider: provider.id().to_string(),
            }),
        }
    }

    fn subject_lock(&self, subject: &Subject) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.subject_locks.lock().unwrap_or_else(|poisoned| {
            warn!("Subject lock map mutex was poisoned, recovering");
            poisoned.into_inner()
        });
        locks.entry(subject.clone()).or_default().clone()
    }

    fn lock_states(&self) -> MutexGuard<'_, HashMap<Subject, DegradedState>> {
        self.states.lock().unwrap_or_else(|poisoned| {
            warn!("Degraded state mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        self.synthetic_rng.lock().unwrap_or_else(|poisoned| {
            warn!("Synthetic rng mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<Subject, CandleSeries>> {
        self.cache.lock().unwrap_or_else(|poisoned| {
            warn!("Candle cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
