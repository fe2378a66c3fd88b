//! Broadcast-backed view refresh signal.
//!
//! The import cycle calls [`ViewRefresh::events_imported`] after a cycle that
//! created events. Presentation code subscribes and re-reads the store.

use chrono::Utc;
use finsync_core::ViewRefresh;
use finsync_domain::constants::EVENT_SYNC_IMPORTED;
use finsync_domain::SyncNotice;
use tokio::sync::broadcast;
use tracing::{debug, trace};

const DEFAULT_CAPACITY: usize = 16;

/// Fans out [`SyncNotice`]s to every live subscriber.
#[derive(Debug, Clone)]
pub struct BroadcastViewRefresh {
    sender: broadcast::Sender<SyncNotice>,
}

impl BroadcastViewRefresh {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncNotice> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastViewRefresh {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRefresh for BroadcastViewRefresh {
    fn events_imported(&self, count: usize) {
        let notice = SyncNotice { imported: count, at: Utc::now() };
        match self.sender.send(notice) {
            Ok(receivers) => {
                debug!(event = EVENT_SYNC_IMPORTED, count, receivers, "view refresh sent")
            }
            // nobody is watching; the next read picks the events up anyway
            Err(_) => trace!(event = EVENT_SYNC_IMPORTED, count, "view refresh dropped"),
        }
    }
}
