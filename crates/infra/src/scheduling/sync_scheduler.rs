//! Sync scheduler for periodic import cycles.
//!
//! Runs [`ImportCycle::run_once_with_report`] on a fixed interval with
//! lifecycle management. A tick is skipped when provider sync is disabled or
//! the previous cycle is still in flight; overlapping ticks are dropped, never
//! queued.
//!
//! Each cycle is bounded by `cycle_timeout`. A cycle that overruns it is
//! dropped at its current await point instead of being left to finish, which
//! is the one case where an in-flight cycle does not complete. Every store
//! call is atomic on its own, so a dropped cycle leaves no partial record;
//! the events it did not reach are picked up by the next tick.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use finsync_core::ImportCycle;
//! use finsync_infra::observability::SyncMetrics;
//! use finsync_infra::scheduling::{SyncScheduler, SyncSchedulerConfig};
//!
//! # async fn example(cycle: Arc<ImportCycle>) -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = Arc::new(SyncMetrics::new());
//! let mut scheduler = SyncScheduler::new(
//!     cycle,
//!     SyncSchedulerConfig { interval: Duration::from_secs(300), ..Default::default() },
//!     metrics,
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use finsync_core::ImportCycle;
use finsync_domain::SyncConfig;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::observability::SyncMetrics;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Extra time granted to an in-flight cycle when stopping
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for sync scheduler
#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
    /// Time between cycle starts
    pub interval: Duration,
    /// Upper bound for a single cycle
    pub cycle_timeout: Duration,
    /// Provider integration switch; ticks are skipped when false
    pub enabled: bool,
}

impl Default for SyncSchedulerConfig {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for SyncSchedulerConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_seconds.max(1)),
            cycle_timeout: Duration::from_secs(config.cycle_timeout_seconds.max(1)),
            enabled: config.enabled,
        }
    }
}

/// Sync scheduler for periodic import cycles
pub struct SyncScheduler {
    cycle: Arc<ImportCycle>,
    config: SyncSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
    metrics: Arc<SyncMetrics>,
}

impl SyncScheduler {
    pub fn new(
        cycle: Arc<ImportCycle>,
        config: SyncSchedulerConfig,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        Self {
            cycle,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
            metrics,
        }
    }

    pub fn config(&self) -> &SyncSchedulerConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<SyncMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Start the scheduler
    ///
    /// Spawns a background task that runs the import cycle periodically.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(
            interval_secs = self.config.interval.as_secs(),
            enabled = self.config.enabled,
            "Starting sync scheduler"
        );

        // Create a new cancellation token (supports restart after stop)
        self.cancellation_token = CancellationToken::new();

        let cycle = Arc::clone(&self.cycle);
        let metrics = Arc::clone(&self.metrics);
        let config = self.config.clone();
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::sync_loop(cycle, config, metrics, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Sync scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// Cancels the timer and waits for an in-flight cycle to finish.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is not running or the task does not finish
    /// within the cycle timeout plus a grace period
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping sync scheduler");

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = self.config.cycle_timeout + STOP_GRACE;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|err| SchedulerError::TaskJoinFailed(err.to_string()))?;
        }

        info!(metrics = ?self.metrics.snapshot(), "Sync scheduler stopped");
        Ok(())
    }

    /// Check if scheduler is running
    ///
    /// A scheduler is considered running if it has an active task handle that
    /// hasn't finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Background sync loop
    async fn sync_loop(
        cycle: Arc<ImportCycle>,
        config: SyncSchedulerConfig,
        metrics: Arc<SyncMetrics>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Sync loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(config.interval) => {
                    Self::tick(&cycle, &config, &metrics).await;
                }
            }
        }
    }

    async fn tick(cycle: &ImportCycle, config: &SyncSchedulerConfig, metrics: &SyncMetrics) {
        if !config.enabled {
            debug!("Provider sync disabled, skipping tick");
            metrics.record_skip();
            return;
        }

        if cycle.is_running() {
            debug!("Previous import cycle still running, skipping tick");
            metrics.record_skip();
            return;
        }

        let started = Instant::now();
        match tokio::time::timeout(config.cycle_timeout, cycle.run_once_with_report()).await {
            Ok(report) => {
                metrics.record_cycle(&report, started.elapsed());
                debug!(
                    imported = report.imported,
                    linked = report.linked,
                    failed = report.failed,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Scheduled import cycle finished"
                );
            }
            Err(_) => {
                warn!(
                    timeout_secs = config.cycle_timeout.as_secs(),
                    "Import cycle timed out and was abandoned"
                );
                metrics.record_timeout();
            }
        }
    }
}

/// Ensure scheduler is stopped when dropped
impl Drop for SyncScheduler {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() && self.is_running() {
            warn!("SyncScheduler dropped while running; cancelling");
        }
        self.cancellation_token.cancel();
    }
}
