//! Import cycle metrics
//!
//! Counters are fed by the sync scheduler after each tick and read back as a
//! [`SyncMetricsSnapshot`] for logging.
//!
//! ## Design
//! - **SeqCst ordering** for the pair used in derived metrics (average cycle
//!   time)
//! - **Relaxed** for independent counters
//! - **Microsecond storage** for durations, reported in ms

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use finsync_domain::ImportReport;
use serde::Serialize;

use crate::observability::{MetricsError, MetricsResult};

/// Metrics for scheduled import cycles
#[derive(Debug, Default)]
pub struct SyncMetrics {
    /// Cycles that ran to completion (including ones whose fetch failed)
    pub cycles_completed: AtomicUsize,
    /// Ticks skipped because sync was disabled or a cycle was in flight
    pub cycles_skipped: AtomicUsize,
    /// Cycles abandoned after exceeding the cycle timeout
    pub cycles_timed_out: AtomicUsize,
    pub fetch_failures: AtomicUsize,
    pub events_imported: AtomicUsize,
    pub events_linked: AtomicUsize,
    pub events_failed: AtomicUsize,
    pub conflicts: AtomicUsize,
    pub total_cycle_time_micros: AtomicU64,
    pub last_cycle_time_micros: AtomicU64,
}

/// Point-in-time copy of [`SyncMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SyncMetricsSnapshot {
    pub cycles_completed: usize,
    pub cycles_skipped: usize,
    pub cycles_timed_out: usize,
    pub fetch_failures: usize,
    pub events_imported: usize,
    pub events_linked: usize,
    pub events_failed: usize,
    pub conflicts: usize,
    pub last_cycle_ms: u64,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished cycle and its report
    pub fn record_cycle(&self, report: &ImportReport, elapsed: Duration) {
        if report.skipped_reentrant {
            self.record_skip();
            return;
        }

        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.total_cycle_time_micros.fetch_add(micros, Ordering::SeqCst);
        self.cycles_completed.fetch_add(1, Ordering::SeqCst);
        self.last_cycle_time_micros.store(micros, Ordering::Relaxed);

        if report.fetch_failed {
            self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        }
        self.events_imported.fetch_add(report.imported, Ordering::Relaxed);
        self.events_linked.fetch_add(report.linked, Ordering::Relaxed);
        self.events_failed.fetch_add(report.failed, Ordering::Relaxed);
        self.conflicts.fetch_add(report.conflicts, Ordering::Relaxed);
    }

    pub fn record_skip(&self) {
        self.cycles_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.cycles_timed_out.fetch_add(1, Ordering::Relaxed);
    }

    /// Average wall time of completed cycles in milliseconds
    pub fn avg_cycle_time_ms(&self) -> MetricsResult<f64> {
        let total = self.total_cycle_time_micros.load(Ordering::SeqCst);
        let count = self.cycles_completed.load(Ordering::SeqCst);

        if count == 0 {
            return Err(MetricsError::EmptyData { metric: "average cycle time" });
        }

        Ok((total as f64 / count as f64) / 1_000.0)
    }

    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        SyncMetricsSnapshot {
            cycles_completed: self.cycles_completed.load(Ordering::SeqCst),
            cycles_skipped: self.cycles_skipped.load(Ordering::Relaxed),
            cycles_timed_out: self.cycles_timed_out.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            events_imported: self.events_imported.load(Ordering::Relaxed),
            events_linked: self.events_linked.load(Ordering::Relaxed),
            events_failed: self.events_failed.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            last_cycle_ms: self.last_cycle_time_micros.load(Ordering::Relaxed) / 1_000,
        }
    }
}
