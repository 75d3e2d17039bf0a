//! Scan cycle: rank subjects by volume, analyze each one, emit signals.
//!
//! Subjects are analyzed one after another with a fixed pause between them;
//! within one subject every provider is queried concurrently by the
//! aggregator. A failing subject is logged and counted, never fatal for the
//! cycle.

use std::sync::Arc;
use std::time::Duration;

use candlewatch_market_data::{CandleAggregator, Subject, TickerSource};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::errors::{Error, Result};
use crate::indicators;
use crate::signals::{Signal, SignalDeduplicator, SignalNotifier};

/// Tunables of a scan cycle.
#[derive(Clone, Debug)]
pub struct ScannerConfig {
    /// Quote asset the ranking is restricted to.
    pub quote_asset: String,
    /// Pause between two subjects of a cycle.
    pub pacing: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            quote_asset: "USDT".to_string(),
            pacing: Duration::from_millis(300),
        }
    }
}

/// Counters of one cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Subjects returned by the ranking.
    pub ranked: usize,
    /// Subjects whose series could be analyzed.
    pub analyzed: usize,
    /// Signals emitted.
    pub emitted: usize,
    /// Subjects with no usable data this cycle.
    pub unavailable: usize,
    /// Subjects whose analysis failed for any other reason.
    pub failed: usize,
}

impl CycleReport {
    /// Count the result of analyzing `subject`.
    pub fn record(&mut self, subject: &Subject, result: Result<bool>) {
        match result {
            Ok(emitted) => {
                self.analyzed += 1;
                if emitted {
                    self.emitted += 1;
                }
            }
            Err(e) if e.is_unavailable() => {
                self.unavailable += 1;
                info!("{} unavailable this cycle: {}", subject, e);
            }
            Err(e) => {
                self.failed += 1;
                warn!("Analysis of {} failed: {}", subject, e);
            }
        }
    }
}

/// Drives the fetch, analyze and emit pipeline.
pub struct Scanner {
    aggregator: Arc<CandleAggregator>,
    tickers: Arc<dyn TickerSource>,
    notifier: Arc<dyn SignalNotifier>,
    dedup: SignalDeduplicator,
    config: ScannerConfig,
}

impl Scanner {
    pub fn new(
        aggregator: Arc<CandleAggregator>,
        tickers: Arc<dyn TickerSource>,
        notifier: Arc<dyn SignalNotifier>,
        config: ScannerConfig,
    ) -> Self {
        Self {
            aggregator,
            tickers,
            notifier,
            dedup: SignalDeduplicator::new(),
            config,
        }
    }

    /// Replace the signal ledger, e.g. to change its retention.
    pub fn with_deduplicator(mut self, dedup: SignalDeduplicator) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn aggregator(&self) -> &CandleAggregator {
        &self.aggregator
    }

    pub fn deduplicator(&self) -> &SignalDeduplicator {
        &self.dedup
    }

    /// The `top_n` subjects by 24h quote volume, highest first.
    pub async fn rank_subjects(&self, top_n: usize) -> Result<Vec<Subject>> {
        let mut volumes = self.tickers.fetch_volumes(&self.config.quote_asset).await?;

        volumes.sort_by(|a, b| b.quote_volume.total_cmp(&a.quote_volume));
        volumes.truncate(top_n);

        debug!(
            "Ranked {} subjects from '{}' ({} quote)",
            volumes.len(),
            self.tickers.id(),
            self.config.quote_asset
        );
        Ok(volumes.into_iter().map(|v| v.subject).collect())
    }

    /// Fetch, score and possibly alert on `subject`. Returns whether a
    /// signal was emitted.
    pub async fn analyze(&self, subject: &Subject) -> Result<bool> {
        self.analyze_at(subject, Utc::now()).await
    }

    /// Same as [`analyze`](Self::analyze) with an explicit wall clock.
    pub async fn analyze_at(&self, subject: &Subject, now: DateTime<Utc>) -> Result<bool> {
        let outcome = self.aggregator.fetch_at(subject, now).await?;
        let closes = outcome.series.closes();

        let analysis = indicators::analyze(&closes).ok_or_else(|| Error::InsufficientData {
            subject: subject.to_string(),
            len: closes.len(),
        })?;

        debug!(
            "{}: score {:.4}, rsi {:.2}, source {}",
            subject, analysis.score, analysis.rsi, outcome.source
        );

        let Some(signal) = Signal::from_analysis(
            subject.clone(),
            &analysis,
            outcome.used_fallback(),
            outcome.source.to_string(),
            now,
        ) else {
            return Ok(false);
        };

        if !self.dedup.should_emit(subject, now) {
            debug!("{}: signal already emitted today, suppressed", subject);
            return Ok(false);
        }

        info!(
            "Signal {} {} (score {:.4}, fallback {})",
            subject, signal.direction, signal.score, signal.used_fallback
        );
        if let Err(e) = self.notifier.notify(&signal).await {
            warn!("Failed to deliver signal for {}: {}", subject, e);
        }
        Ok(true)
    }

    /// Rank, then analyze every ranked subject in order.
    ///
    /// Only a ranking failure is returned as an error; per-subject failures
    /// end up in the report.
    pub async fn run_cycle(&self, top_n: usize) -> Result<CycleReport> {
        let subjects = self.rank_subjects(top_n).await?;
        let mut report = CycleReport {
            ranked: subjects.len(),
            ..CycleReport::default()
        };

        for (i, subject) in subjects.iter().enumerate() {
            if i > 0 && !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }

            let result = self.analyze(subject).await;
            report.record(subject, result);
        }

        info!(
            "Cycle complete: {} ranked, {} analyzed, {} emitted, {} unavailable, {} failed",
            report.ranked, report.analyzed, report.emitted, report.unavailable, report.failed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use candlewatch_market_data::{MarketDataError, TickerVolume};

    struct StaticTickers(Vec<(&'static str, f64)>);

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
                .map(|(name, quote_volume)| {
                    Ok(TickerVolume {
                        subject: name.parse()?,
                        quote_volume: *quote_volume,
                    })
                })
                .collect()
        }
    }

    struct FailingTickers;

    #[async_trait]
    impl TickerSource for FailingTickers {
        fn id(&self) -> &'static str {
            "FAILING"
        }

        async fn fetch_volumes(
            &self,
            _quote_asset: &str,
        ) -> std::result::Result<Vec<TickerVolume>, MarketDataError> {
            Err(MarketDataError::RateLimited {
                provider: "FAILING".to_string(),
            })
        }
    }

    fn scanner(tickers: Arc<dyn TickerSource>) -> Scanner {
        Scanner::new(
            Arc::new(CandleAggregator::new(Vec::new())),
            tickers,
            Arc::new(crate::signals::LogNotifier),
            ScannerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_rank_subjects_by_volume() {
        let tickers = StaticTickers(vec![
            ("ADA/USDT", 5.0e6),
            ("BTC/USDT", 1.0e9),
            ("SOL/USDT", 2.0e8),
            ("ETH/USDT", 4.0e8),
        ]);
        let scanner = scanner(Arc::new(tickers));

        let ranked = scanner.rank_subjects(3).await.unwrap();
        let names: Vec<String> = ranked.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["BTC/USDT", "ETH/USDT", "SOL/USDT"]);

        assert_eq!(scanner.rank_subjects(10).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_ranking_failure_aborts_cycle() {
        let scanner = scanner(Arc::new(FailingTickers));
        let err = scanner.run_cycle(5).await.unwrap_err();
        assert!(matches!(
            err,
            Error::MarketData(MarketDataError::RateLimited { .. })
        ));
    }

    #[test]
    fn test_report_separates_unavailable_from_failed() {
        let subject: Subject = "ABC/USDT".parse().unwrap();
        let mut report = CycleReport::default();

        report.record(&subject, Ok(true));
        report.record(&subject, Ok(false));
        report.record(
            &subject,
            Err(Error::MarketData(MarketDataError::Exhausted {
                subject: subject.to_string(),
            })),
        );
        report.record(
            &subject,
            Err(Error::MarketData(MarketDataError::Malformed {
                provider: "BINANCE".to_string(),
                message: "bad body".to_string(),
            })),
        );
        report.record(&subject, Err(Error::Notification("relay down".to_string())));

        assert_eq!(
            report,
            CycleReport {
                ranked: 0,
                analyzed: 2,
                emitted: 1,
                unavailable: 1,
                failed: 2,
            }
        );
    }
}
