//! Link maintainer
//!
//! Attaches a provider identifier to an existing local event. Only sync
//! metadata is written: `provider_id`, `source = bidirectional` and
//! `last_synced_at`. A record that gained a different identifier since it was
//! read (a concurrent export, say) is left alone.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::{Clock, EventStore};

/// Establishes provider linkage on local events
#[derive(Clone)]
pub struct LinkMaintainer {
    store: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
}

impl LinkMaintainer {
    pub fn new(store: Arc<dyn EventStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Link `event_id` to `provider_id`.
    ///
    /// Idempotent apart from refreshing `last_synced_at`. Store failures and
    /// records already linked elsewhere are logged and reported as `false`;
    /// a missed link is re-detected by the next cycle.
    pub async fn link(&self, event_id: &str, provider_id: &str) -> bool {
        match self.store.link_provider(event_id, provider_id, self.clock.now()).await {
            Ok(true) => {
                debug!(event_id, provider_id, "Linked local event to provider event");
                true
            }
            Ok(false) => {
                warn!(event_id, provider_id, "Local event was linked elsewhere meanwhile");
                false
            }
            Err(err) => {
                warn!(event_id, provider_id, error = %err, "Failed to link local event");
                false
            }
        }
    }
}
