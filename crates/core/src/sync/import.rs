//! Import cycle
//!
//! One reconciliation pass over the provider's events in the sync window.
//! Already-linked events are skipped by identifier, the rest are matched by
//! content against local events on the same day and either linked or
//! imported. Unlinked records are preferred as link targets; a match that is
//! only linked to other provider events is a conflict. A per-instance guard
//! keeps passes from overlapping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use finsync_domain::{
    days_from, ConflictPolicy, Event, ImportReport, NewEvent, ProviderEvent, Result, SyncConfig,
    SyncWindow,
};
use tracing::{debug, info, instrument, warn};

use super::linker::LinkMaintainer;
use super::ports::{Clock, EventStore, ProviderClient, SystemClock, ViewRefresh};
use crate::reconcile::{convert, find_duplicate};

/// Window bounds and conflict handling for the import cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSettings {
    pub lookback_days: i64,
    pub lookahead_days: i64,
    pub max_distance_days: i64,
    pub conflict_policy: ConflictPolicy,
}

impl From<&SyncConfig> for ImportSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            lookback_days: config.lookback_days,
            lookahead_days: config.lookahead_days,
            max_distance_days: config.max_distance_days,
            conflict_policy: config.conflict_policy,
        }
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

/// What happened to a single provider event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Imported,
    Linked,
    LinkFailed,
    AlreadyLinked,
    OutOfWindow,
    Unmappable,
    Conflict,
}

/// Releases the in-progress flag on every exit path, including when the
/// cycle future is dropped mid-flight.
struct CycleGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> CycleGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Reconciliation pass between the provider and the local store
pub struct ImportCycle {
    store: Arc<dyn EventStore>,
    provider: Arc<dyn ProviderClient>,
    refresh: Arc<dyn ViewRefresh>,
    clock: Arc<dyn Clock>,
    linker: LinkMaintainer,
    settings: ImportSettings,
    in_progress: AtomicBool,
}

impl ImportCycle {
    pub fn new(
        store: Arc<dyn EventStore>,
        provider: Arc<dyn ProviderClient>,
        refresh: Arc<dyn ViewRefresh>,
        settings: ImportSettings,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let linker = LinkMaintainer::new(Arc::clone(&store), Arc::clone(&clock));
        Self {
            store,
            provider,
            refresh,
            clock,
            linker,
            settings,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Replace the clock used for the window, distance bound and timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.linker = LinkMaintainer::new(Arc::clone(&self.store), Arc::clone(&clock));
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Whether a pass is currently in flight
    pub fn is_running(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Run one pass and return the number of newly created local events.
    pub async fn run_once(&self) -> usize {
        self.run_once_with_report().await.imported
    }

    /// Run one pass and return its full outcome counters.
    ///
    /// Returns immediately with `skipped_reentrant` set when another pass is
    /// in flight; no provider call is made in that case.
    #[instrument(skip(self))]
    pub async fn run_once_with_report(&self) -> ImportReport {
        let Some(_guard) = CycleGuard::acquire(&self.in_progress) else {
            debug!("Import cycle already in progress, skipping");
            return ImportReport::reentrant_skip();
        };

        let now = self.clock.now();
        let window =
            SyncWindow::around(now, self.settings.lookback_days, self.settings.lookahead_days);
        let mut report = ImportReport::default();

        let fetched = self.provider.list_events(window.time_min, window.time_max).await;
        let provider_events = match fetched {
            Ok(events) => events,
            Err(err) => {
                warn!(error = %err, "Failed to fetch provider events");
                report.fetch_failed = true;
                return report;
            }
        };
        report.fetched = provider_events.len();

        for provider_event in &provider_events {
            match self.process_event(provider_event, now).await {
                Ok(Outcome::Imported) => report.imported += 1,
                Ok(Outcome::Linked) => report.linked += 1,
                Ok(Outcome::AlreadyLinked) => report.already_linked += 1,
                Ok(Outcome::OutOfWindow) => report.out_of_window += 1,
                Ok(Outcome::Unmappable) => report.unmappable += 1,
                Ok(Outcome::Conflict) => report.conflicts += 1,
                Ok(Outcome::LinkFailed) => report.failed += 1,
                Err(err) => {
                    warn!(
                        provider_id = %provider_event.id,
                        error = %err,
                        "Failed to reconcile provider event"
                    );
                    report.failed += 1;
                }
            }
        }

        if report.imported > 0 {
            self.refresh.events_imported(report.imported);
        }

        info!(
            fetched = report.fetched,
            imported = report.imported,
            linked = report.linked,
            already_linked = report.already_linked,
            conflicts = report.conflicts,
            failed = report.failed,
            "Import cycle complete"
        );

        report
    }

    async fn process_event(&self, event: &ProviderEvent, now: DateTime<Utc>) -> Result<Outcome> {
        if event.id.trim().is_empty() {
            return Ok(Outcome::Unmappable);
        }

        let Some(date) = event.effective_date() else {
            return Ok(Outcome::Unmappable);
        };
        if days_from(now, date) > self.settings.max_distance_days {
            debug!(provider_id = %event.id, %date, "Provider event outside distance bound");
            return Ok(Outcome::OutOfWindow);
        }

        let Some(converted) = convert(event, now) else {
            return Ok(Outcome::Unmappable);
        };

        if self.store.find_by_provider_id(&event.id).await?.is_some() {
            return Ok(Outcome::AlreadyLinked);
        }

        let same_day = self.store.list_events_on_date(converted.date).await?;
        let (unlinked, linked): (Vec<Event>, Vec<Event>) =
            same_day.into_iter().partition(|e| !e.is_linked());

        // Content-only probe: the identifier was handled above and the
        // classified type is advisory.
        let probe = NewEvent { provider_id: None, event_type: None, ..converted.clone() };

        if let Some(existing) = find_duplicate(&probe, &unlinked) {
            return if self.linker.link(&existing.id, &event.id).await {
                Ok(Outcome::Linked)
            } else {
                Ok(Outcome::LinkFailed)
            };
        }

        // Only records linked to other provider events are left to match.
        match find_duplicate(&probe, &linked) {
            Some(existing) => match self.settings.conflict_policy {
                ConflictPolicy::Skip => {
                    warn!(
                        provider_id = %event.id,
                        local_id = %existing.id,
                        linked_to = existing.provider_id().unwrap_or_default(),
                        "Provider event matches a local event linked elsewhere, skipping"
                    );
                    Ok(Outcome::Conflict)
                }
                ConflictPolicy::ImportSeparately => {
                    let created = self.store.create(converted).await?;
                    info!(
                        provider_id = %event.id,
                        local_id = %created.id,
                        conflicting_id = %existing.id,
                        "Imported conflicting provider event as a separate record"
                    );
                    Ok(Outcome::Imported)
                }
            },
            None => {
                let created = self.store.create(converted).await?;
                debug!(provider_id = %event.id, local_id = %created.id, "Imported provider event");
                Ok(Outcome::Imported)
            }
        }
    }
}
