//! Event service - foreground add, edit, delete and export

use std::sync::Arc;

use finsync_domain::constants::EXPORT_BOILERPLATE;
use finsync_domain::{
    classify_event, Event, EventPatch, FinSyncError, NewEvent, ProviderEventDraft, Result,
    SyncSource,
};
use tracing::{info, instrument};

use crate::sync::ports::{Clock, EventStore, ProviderClient, SystemClock};
use crate::sync::DeletionPropagator;

/// Foreground API over the local store
///
/// Store failures are returned to the caller. Deletion goes through the
/// [`DeletionPropagator`] so linked events are removed from the provider
/// first.
pub struct EventService {
    store: Arc<dyn EventStore>,
    provider: Arc<dyn ProviderClient>,
    deletion: DeletionPropagator,
    clock: Arc<dyn Clock>,
    provider_enabled: bool,
}

impl EventService {
    /// Create a new event service
    pub fn new(
        store: Arc<dyn EventStore>,
        provider: Arc<dyn ProviderClient>,
        provider_enabled: bool,
    ) -> Self {
        let deletion =
            DeletionPropagator::new(Arc::clone(&store), Arc::clone(&provider), provider_enabled);
        Self { store, provider, deletion, clock: Arc::new(SystemClock), provider_enabled }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create a native event.
    ///
    /// Provider linkage in the draft is discarded; links are only made by
    /// sync. The type is classified from the text when not given.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn add_event(&self, draft: NewEvent) -> Result<Event> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(FinSyncError::InvalidInput("event title must not be empty".into()));
        }

        let event_type = draft
            .event_type
            .unwrap_or_else(|| classify_event(&title, draft.description.as_deref()));

        let new_event = NewEvent {
            title,
            event_type: Some(event_type),
            provider_id: None,
            source: SyncSource::Native,
            last_synced_at: None,
            ..draft
        };

        let created = self.store.create(new_event).await?;
        info!(event_id = %created.id, "Event created");
        Ok(created)
    }

    /// Apply user edits and bump the sync version.
    ///
    /// Sync metadata in the patch is ignored.
    #[instrument(skip(self, patch))]
    pub async fn update_event(&self, id: &str, patch: EventPatch) -> Result<Event> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(FinSyncError::InvalidInput("event title must not be empty".into()));
        }

        let user_patch = EventPatch {
            title: patch.title.map(|t| t.trim().to_string()),
            date: patch.date,
            time: patch.time,
            description: patch.description,
            event_type: patch.event_type,
            bump_version: true,
            ..EventPatch::default()
        };

        self.store.update(id, user_patch).await?;
        self.require(id).await
    }

    /// Delete an event, propagating to the provider when linked.
    pub async fn delete_event(&self, id: &str) -> Result<()> {
        self.deletion.delete_event(id).await
    }

    /// Push a local event to the provider and link the returned identifier.
    ///
    /// Already-linked events are not pushed again; their identifier is
    /// returned as-is.
    #[instrument(skip(self))]
    pub async fn export_event(&self, id: &str) -> Result<String> {
        let event = self.require(id).await?;
        if let Some(provider_id) = event.provider_id().filter(|p| !p.is_empty()) {
            return Ok(provider_id.to_string());
        }
        if !self.provider_enabled {
            return Err(FinSyncError::Config("provider integration is disabled".into()));
        }

        let description = match event.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => format!("{text}\n\n{EXPORT_BOILERPLATE}"),
            _ => EXPORT_BOILERPLATE.to_string(),
        };
        let draft = ProviderEventDraft {
            summary: event.title.clone(),
            description: Some(description),
            date: event.date,
            time: event.time.clone(),
        };

        let provider_id = self.provider.create_event(&draft).await?;

        let patch =
            EventPatch { bump_version: true, ..EventPatch::link(&provider_id, self.clock.now()) };
        self.store.update(id, patch).await?;

        info!(event_id = id, provider_id = %provider_id, "Event exported to provider");
        Ok(provider_id)
    }

    async fn require(&self, id: &str) -> Result<Event> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| FinSyncError::NotFound(format!("event {id}")))
    }
}
