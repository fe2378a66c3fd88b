//! Deletion propagator
//!
//! Provider-side deletion is always attempted before the local record is
//! removed. A crash in between leaves the local record in place, and deleting
//! again finishes the job.

use std::sync::Arc;

use finsync_domain::{FinSyncError, Result};
use tracing::{info, instrument, warn};

use super::ports::{EventStore, ProviderClient};

/// Deletes events locally and, when linked, on the provider
pub struct DeletionPropagator {
    store: Arc<dyn EventStore>,
    provider: Arc<dyn ProviderClient>,
    provider_enabled: bool,
}

impl DeletionPropagator {
    pub fn new(
        store: Arc<dyn EventStore>,
        provider: Arc<dyn ProviderClient>,
        provider_enabled: bool,
    ) -> Self {
        Self { store, provider, provider_enabled }
    }

    /// Delete `event_id`.
    ///
    /// # Errors
    /// `NotFound` when the event does not exist, or the store's error when
    /// the local delete fails. Provider failures are logged and swallowed.
    #[instrument(skip(self))]
    pub async fn delete_event(&self, event_id: &str) -> Result<()> {
        let event = self
            .store
            .get(event_id)
            .await?
            .ok_or_else(|| FinSyncError::NotFound(format!("event {event_id}")))?;

        if let Some(provider_id) = event.provider_id().filter(|id| !id.is_empty()) {
            if self.provider_enabled {
                if let Err(err) = self.provider.delete_event(provider_id).await {
                    warn!(
                        event_id,
                        provider_id,
                        error = %err,
                        "Provider deletion failed, continuing with local deletion"
                    );
                }
            }
        }

        self.store.delete(event_id).await?;
        info!(event_id, "Event deleted");
        Ok(())
    }
}
