//! Per-provider circuit breaker.
//!
//! A provider that keeps timing out or erroring is taken out of the race for
//! a cooldown period instead of being hit on every fetch:
//!
//! - **Closed**: the provider joins every race.
//! - **Open**: the provider is reported as `CircuitOpen` without a request.
//! - **HalfOpen**: the cooldown elapsed; the provider joins races again and
//!   closes after enough successes, or reopens on the first failure.
//!
//! State is in-memory only.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

/// Penalised failures in a row before the circuit opens.
const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Cooldown before an open circuit is probed again.
const DEFAULT_RECOVERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Successes needed in HalfOpen before closing.
const DEFAULT_HALF_OPEN_SUCCESSES: u32 = 2;

/// Circuit breaker state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
            Self::HalfOpen => write!(f, "HalfOpen"),
        }
    }
}

#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_successes: u32,
    opened_at: Option<Instant>,
}

impl Default for Circuit {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            half_open_successes: 0,
            opened_at: None,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub recovery_timeout: Duration,
    pub half_open_success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            recovery_timeout: DEFAULT_RECOVERY_TIMEOUT,
            half_open_success_threshold: DEFAULT_HALF_OPEN_SUCCESSES,
        }
    }
}

/// Thread-safe circuit breaker keyed by provider id.
pub struct CircuitBreaker {
    circuits: Mutex<HashMap<&'static str, Circuit>>,
    config: CircuitBreakerConfig,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Lock the circuits map, recovering from poison.
    fn lock_circuits(&self) -> MutexGuard<'_, HashMap<&'static str, Circuit>> {
        self.circuits.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Whether `provider` may join the current race.
    pub fn is_allowed(&self, provider: &'static str) -> bool {
        self.is_allowed_at(provider, Instant::now())
    }

    /// Same as [`is_allowed`](Self::is_allowed) with an explicit clock.
    /// Moves Open to HalfOpen once the cooldown has elapsed.
    pub fn is_allowed_at(&self, provider: &'static str, now: Instant) -> bool {
        let mut circuits = self.lock_circuits();
        let circuit = circuits.entry(provider).or_default();

        match circuit.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooled_down = circuit
                    .opened_at
                    .map(|at| now.saturating_duration_since(at) >= self.config.recovery_timeout)
                    .unwrap_or(true);

                if cooled_down {
                    info!("Circuit breaker: '{}' Open -> HalfOpen", provider);
                    circuit.state = CircuitState::HalfOpen;
                    circuit.half_open_successes = 0;
                }
                cooled_down
            }
        }
    }

    pub fn record_success(&self, provider: &'static str) {
        let mut circuits = self.lock_circuits();
        let circuit = circuits.entry(provider).or_default();

        circuit.consecutive_failures = 0;

        if circuit.state == CircuitState::HalfOpen {
            circuit.half_open_successes += 1;
            if circuit.half_open_successes >= self.config.half_open_success_threshold {
                info!(
                    "Circuit breaker: '{}' HalfOpen -> Closed after {} successes",
                    provider, circuit.half_open_successes
                );
                *circuit = Circuit::default();
            }
        }
    }

    pub fn record_failure(&self, provider: &'static str) {
        self.record_failure_at(provider, Instant::now());
    }

    /// Count a penalised failure. Opens the circuit at the threshold, or
    /// immediately when HalfOpen.
    pub fn record_failure_at(&self, provider: &'static str, now: Instant) {
        let mut circuits = self.lock_circuits();
        let circuit = circuits.entry(provider).or_default();

        circuit.consecutive_failures += 1;

        let should_open = match circuit.state {
            CircuitState::Closed => circuit.consecutive_failures >= self.config.failure_threshold,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };

        if should_open {
            info!(
                "Circuit breaker: opening '{}' after {} consecutive failures",
                provider, circuit.consecutive_failures
            );
            circuit.state = CircuitState::Open;
            circuit.opened_at = Some(now);
            circuit.half_open_successes = 0;
        } else {
            debug!(
                "Circuit breaker: failure for '{}' ({}/{})",
                provider, circuit.consecutive_failures, self.config.failure_threshold
            );
        }
    }

    pub fn state(&self, provider: &str) -> CircuitState {
        self.lock_circuits()
            .get(provider)
            .map(|c| c.state)
            .unwrap_or(CircuitState::Closed)
    }

    pub fn failure_count(&self, provider: &str) -> u32 {
        self.lock_circuits()
            .get(provider)
            .map(|c| c.consecutive_failures)
            .unwrap_or(0)
    }
}
