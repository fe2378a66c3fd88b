//! Port interfaces for event reconciliation
//!
//! The engine reaches the local store, the calendar provider and the
//! presentation layer only through these traits. Adapters live in
//! `finsync-infra`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use finsync_domain::{Event, EventPatch, NewEvent, ProviderEvent, ProviderEventDraft, Result};

/// Local, authoritative event store.
///
/// Each call is strongly consistent on its own; no transaction spans calls.
/// Implementations return owned copies, never live references.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// All events on one calendar day
    async fn list_events_on_date(&self, date: NaiveDate) -> Result<Vec<Event>>;

    /// Event linked to the given provider identifier, if any
    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Option<Event>>;

    async fn get(&self, id: &str) -> Result<Option<Event>>;

    /// Insert a new event; the store assigns its identifier
    async fn create(&self, event: NewEvent) -> Result<Event>;

    /// Apply a partial update; `NotFound` when the event is gone
    async fn update(&self, id: &str, patch: EventPatch) -> Result<()>;

    /// Attach `provider_id` only while the event is unlinked or already
    /// carries that identifier. `Ok(false)` when it is linked elsewhere;
    /// `NotFound` when the event is gone.
    async fn link_provider(
        &self,
        id: &str,
        provider_id: &str,
        synced_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Remove an event; `NotFound` when the event is gone
    async fn delete(&self, id: &str) -> Result<()>;
}

/// External calendar provider.
///
/// Credentials are supplied by the adapter; the engine never refreshes them.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Events starting within `[time_min, time_max]`
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<ProviderEvent>>;

    async fn delete_event(&self, provider_id: &str) -> Result<()>;

    /// Create an event and return its provider identifier
    async fn create_event(&self, draft: &ProviderEventDraft) -> Result<String>;
}

/// Fire-and-forget signal to re-render calendar views.
pub trait ViewRefresh: Send + Sync {
    fn events_imported(&self, count: usize);
}

/// Refresh sink that drops every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopViewRefresh;

impl ViewRefresh for NoopViewRefresh {
    fn events_imported(&self, _count: usize) {}
}

/// Source of "now" for window and distance calculations.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
