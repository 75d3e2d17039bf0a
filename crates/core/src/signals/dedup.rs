//! At most one signal per subject per UTC calendar day.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use candlewatch_market_data::Subject;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{debug, warn};

/// Days of ledger history kept behind the current UTC date.
pub const DEFAULT_RETENTION_DAYS: i64 = 2;

/// Ledger of `(subject, UTC date)` pairs already alerted.
#[derive(Debug)]
pub struct SignalDeduplicator {
    ledger: Mutex<HashSet<(Subject, NaiveDate)>>,
    retention_days: i64,
}

impl Default for SignalDeduplicator {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalDeduplicator {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETENTION_DAYS)
    }

    /// Keep keys for `days` days before the current date. Only affects
    /// memory; same-day suppression is unchanged.
    pub fn with_retention(days: i64) -> Self {
        Self {
            ledger: Mutex::new(HashSet::new()),
            retention_days: days.max(0),
        }
    }

    /// Record an emission for `subject` on the UTC date of `now`.
    ///
    /// Returns `false` if one was already recorded for that date. Keys older
    /// than the retention window are evicted first.
    pub fn should_emit(&self, subject: &Subject, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        let cutoff = today - Duration::days(self.retention_days);

        let mut ledger = self.lock_ledger();
        let before = ledger.len();
        ledger.retain(|(_, date)| *date >= cutoff);
        if ledger.len() < before {
            debug!("Evicted {} signal ledger keys before {}", before - ledger.len(), cutoff);
        }

        ledger.insert((subject.clone(), today))
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.lock_ledger().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_ledger(&self) -> MutexGuard<'_, HashSet<(Subject, NaiveDate)>> {
        self.ledger.lock().unwrap_or_else(|poisoned| {
            warn!("Signal ledger mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
