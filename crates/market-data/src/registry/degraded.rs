//! Per-subject degraded-mode bookkeeping.
//!
//! Tracks how often a subject has been served from the cache or from
//! synthetic data since its last live fetch, and enforces the quotas of
//! [`FallbackPolicy`]. All transitions take `now` explicitly.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use crate::models::CandleSeries;

/// Quotas bounding how long stale or fabricated data may stand in for live data.
#[derive(Clone, Debug)]
pub struct FallbackPolicy {
    /// Cache hits allowed in a row before the cache tier is refused.
    pub max_cache_reuses: u32,
    /// Synthetic series allowed in a row before the synthetic tier is refused.
    pub max_consecutive_synthetic: u32,
    /// Synthetic series allowed per rolling window.
    pub max_synthetic_per_window: u32,
    /// Length of the synthetic quota window.
    pub synthetic_window: Duration,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            max_cache_reuses: 3,
            max_consecutive_synthetic: 1,
            max_synthetic_per_window: 2,
            synthetic_window: Duration::hours(1),
        }
    }
}

/// Degraded-mode state of one subject. Created on first access, kept for
/// the life of the process.
#[derive(Clone, Debug, Default)]
pub struct DegradedState {
    /// Synthetic series served since the last live success.
    pub consecutive_synthetic: u32,
    /// Grant times of the synthetic series still inside the quota window, oldest first.
    pub recent_synthetic: VecDeque<DateTime<Utc>>,
    /// Most recent live series; seeds warm synthetic extrapolation.
    pub last_real: Option<CandleSeries>,
    /// Cache hits served since the last live success.
    pub cached_uses: u32,
}

impl DegradedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A live fetch succeeded: clear the streak counters and remember the series.
    ///
    /// Synthetic grant times are left alone; they only expire with time.
    pub fn record_live_success(&mut self, series: &CandleSeries) {
        self.consecutive_synthetic = 0;
        self.cached_uses = 0;
        self.last_real = Some(series.clone());
    }

    /// Claim one cache reuse. The caller checks that a cache entry exists.
    pub fn try_reuse_cache(&mut self, policy: &FallbackPolicy) -> bool {
        if self.cached_uses < policy.max_cache_reuses {
            self.cached_uses += 1;
            true
        } else {
            false
        }
    }

    /// Forget grants older than the policy window.
    pub fn expire_window(&mut self, now: DateTime<Utc>, policy: &FallbackPolicy) {
        while let Some(&oldest) = self.recent_synthetic.front() {
            if now - oldest > policy.synthetic_window {
                self.recent_synthetic.pop_front();
            } else {
                break;
            }
        }
    }

    /// Synthetic series granted within the window ending at the last check.
    pub fn window_count(&self) -> u32 {
        self.recent_synthetic.len() as u32
    }

    /// Claim one synthetic generation.
    ///
    /// Any window of `synthetic_window` length holds at most
    /// `max_synthetic_per_window` grants. On success the streak advances
    /// and `now` is recorded.
    pub fn try_reserve_synthetic(&mut self, now: DateTime<Utc>, policy: &FallbackPolicy) -> bool {
        self.expire_window(now, policy);

        if self.consecutive_synthetic < policy.max_consecutive_synthetic
            && self.window_count() < policy.max_synthetic_per_window
        {
            self.consecutive_synthetic += 1;
            self.recent_synthetic.push_back(now);
            true
        } else {
            false
        }
    }
}
