//! Per-provider attempt tracking for one aggregated fetch.

use crate::errors::MarketDataError;
use crate::models::ProviderId;

/// Outcome of one provider within a race.
#[derive(Clone, Debug, PartialEq)]
pub enum AttemptOutcome {
    /// Returned a usable series of this length.
    Success { candles: usize },
    /// Not contacted because its circuit is open.
    Skipped,
    /// Failed; `kind` is [`MarketDataError::kind`].
    Failed { kind: &'static str, message: String },
}

/// Record of a single provider attempt.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub outcome: AttemptOutcome,
}

/// All attempts of one race, in provider priority order.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, provider_id: ProviderId, candles: usize) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            outcome: AttemptOutcome::Success { candles },
        });
    }

    pub fn record_error(&mut self, provider_id: ProviderId, error: &MarketDataError) {
        let outcome = match error {
            MarketDataError::CircuitOpen { .. } => AttemptOutcome::Skipped,
            other => AttemptOutcome::Failed {
                kind: other.kind(),
                message: other.to_string(),
            },
        };
        self.attempts.push(ProviderAttempt {
            provider_id,
            outcome,
        });
    }

    /// Summary for logging, e.g. `BINANCE: timeout -> BYBIT: OK(100)`.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| match &a.outcome {
                AttemptOutcome::Success { candles } => format!("{}: OK({})", a.provider_id, candles),
                AttemptOutcome::Skipped => format!("{}: SKIPPED", a.provider_id),
                AttemptOutcome::Failed { kind, .. } => format!("{}: {}", a.provider_id, kind),
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn success_count(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| matches!(a.outcome, AttemptOutcome::Success { .. }))
            .count()
    }

    pub fn has_success(&self) -> bool {
        self.success_count() > 0
    }
}
