/// Classification for how the aggregator treats a provider failure.
///
/// Every provider is raced on every fetch, so a failure never stops the other
/// providers. The class only decides whether the failure counts against the
/// provider's circuit breaker.
///
/// # Behavior Summary
///
/// | Class | Counts as "no result"? | Record Circuit Breaker Failure? |
/// |-------|------------------------|--------------------------------|
/// | `Never` | n/a (not a provider failure) | No |
/// | `FailoverWithPenalty` | Yes | Yes (affects future fetches) |
/// | `NextProvider` | Yes | No |
/// | `CircuitOpen` | Yes (provider skipped) | No (already recorded) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Terminal outcome for the subject, not attributable to one provider.
    /// Fallback exhaustion and invalid subjects land here.
    Never,

    /// The provider is unhealthy: timeout, connection failure, 5xx status or
    /// rate limiting. Recorded in the circuit breaker, which may exclude the
    /// provider from future races if failures accumulate.
    FailoverWithPenalty,

    /// The provider answered but the answer was unusable for this subject
    /// (unexpected shape, 4xx rejection, too few valid rows). No penalty is recorded.
    NextProvider,

    /// Circuit breaker is open for this provider.
    /// The provider was not contacted.
    CircuitOpen,
}
