//! Background scheduler for periodic scan cycles.
//!
//! The first cycle starts immediately. A cycle that overruns the interval
//! delays the next one instead of triggering a burst.

use std::sync::Arc;
use std::time::Duration;

use candlewatch_core::Scanner;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// Starts the background scan scheduler.
pub fn start_scan_scheduler(scanner: Arc<Scanner>, every: Duration, top_n: usize) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Scan scheduler started ({}s interval, top {})",
            every.as_secs(),
            top_n
        );

        let mut scan_interval = interval(every);
        scan_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            scan_interval.tick().await;
            run_scheduled_cycle(&scanner, top_n).await;
        }
    })
}

/// Runs a single scan cycle. Never panics or returns an error.
async fn run_scheduled_cycle(scanner: &Scanner, top_n: usize) {
    info!("Running scheduled scan...");

    match scanner.run_cycle(top_n).await {
        Ok(report) => {
            info!(
                "Scheduled scan completed: {} emitted, {} unavailable, {} failed of {} ranked",
                report.emitted, report.unavailable, report.failed, report.ranked
            );
        }
        Err(e) => {
            warn!("Scheduled scan skipped: {}", e);
        }
    }
}
