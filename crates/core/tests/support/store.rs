use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use finsync_core::EventStore;
use finsync_domain::{
    Event, EventPatch, FinSyncError, NewEvent, Result as DomainResult, SyncMetadata, SyncSource,
};

use super::Journal;

type ListHook = Box<dyn FnOnce(&mut Vec<Event>) + Send>;

/// In-memory mock for `EventStore`.
///
/// Enforces the one-to-one provider linkage the SQLite schema enforces with
/// its unique index, so linkage bugs surface as store failures.
#[derive(Default, Clone)]
pub struct MockEventStore {
    events: Arc<Mutex<Vec<Event>>>,
    journal: Option<Journal>,
    fail_writes: Arc<AtomicBool>,
    fail_updates: Arc<AtomicBool>,
    after_list: Arc<Mutex<Option<ListHook>>>,
}

impl MockEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Insert an event directly, bypassing the port.
    pub fn seed(&self, event: NewEvent) -> Event {
        let stored = materialize(event);
        self.events.lock().unwrap().push(stored.clone());
        stored
    }

    /// Seed a native event with only a title and a day.
    pub fn seed_native(&self, title: &str, date: NaiveDate) -> Event {
        self.seed(NewEvent::native(title, date))
    }

    pub fn all(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn by_id(&self, id: &str) -> Option<Event> {
        self.events.lock().unwrap().iter().find(|e| e.id == id).cloned()
    }

    /// Make create, update and delete fail with `StoreFailure`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Remove an event behind the engine's back, as a concurrent user would.
    pub fn remove(&self, id: &str) {
        self.events.lock().unwrap().retain(|e| e.id != id);
    }

    /// Delete `id` right after the next same-day listing has been served, so
    /// the engine acts on a snapshot that no longer exists.
    pub fn remove_after_next_list(&self, id: &str) {
        let id = id.to_string();
        *self.after_list.lock().unwrap() =
            Some(Box::new(move |events: &mut Vec<Event>| events.retain(|e| e.id != id)));
    }

    /// Link `id` to `provider_id` right after the next same-day listing, as a
    /// concurrent export would.
    pub fn link_after_next_list(&self, id: &str, provider_id: &str) {
        let (id, provider_id) = (id.to_string(), provider_id.to_string());
        *self.after_list.lock().unwrap() = Some(Box::new(move |events: &mut Vec<Event>| {
            if let Some(event) = events.iter_mut().find(|e| e.id == id) {
                event.sync.provider_id = Some(provider_id);
                event.sync.source = SyncSource::Bidirectional;
            }
        }));
    }

    fn record(&self, entry: String) {
        if let Some(journal) = &self.journal {
            journal.lock().unwrap().push(entry);
        }
    }

    fn check_writable(&self) -> DomainResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FinSyncError::StoreFailure("injected write failure".into()));
        }
        Ok(())
    }
}

fn materialize(event: NewEvent) -> Event {
    Event {
        id: uuid::Uuid::new_v4().to_string(),
        title: event.title,
        date: event.date,
        time: event.time,
        description: event.description,
        event_type: event.event_type,
        sync: SyncMetadata {
            provider_id: event.provider_id,
            source: event.source,
            version: 0,
            last_synced_at: event.last_synced_at,
        },
    }
}

fn provider_id_taken(events: &[Event], provider_id: &str, except: Option<&str>) -> bool {
    events
        .iter()
        .any(|e| e.provider_id() == Some(provider_id) && Some(e.id.as_str()) != except)
}

#[async_trait]
impl EventStore for MockEventStore {
    async fn list_events_on_date(&self, date: NaiveDate) -> DomainResult<Vec<Event>> {
        self.record(format!("store.list:{date}"));
        let mut events = self.events.lock().unwrap();
        let listed: Vec<Event> = events.iter().filter(|e| e.date == date).cloned().collect();
        if let Some(hook) = self.after_list.lock().unwrap().take() {
            hook(&mut *events);
        }
        Ok(listed)
    }

    async fn find_by_provider_id(&self, provider_id: &str) -> DomainResult<Option<Event>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.provider_id() == Some(provider_id))
            .cloned())
    }

    async fn get(&self, id: &str) -> DomainResult<Option<Event>> {
        Ok(self.by_id(id))
    }

    async fn create(&self, event: NewEvent) -> DomainResult<Event> {
        self.record(format!("store.create:{}", event.title));
        self.check_writable()?;
        let mut events = self.events.lock().unwrap();
        if let Some(provider_id) = event.provider_id.as_deref() {
            if provider_id_taken(&events, provider_id, None) {
                return Err(FinSyncError::StoreFailure(format!(
                    "provider id {provider_id} already linked"
                )));
            }
        }
        let stored = materialize(event);
        events.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &str, patch: EventPatch) -> DomainResult<()> {
        self.record(format!("store.update:{id}"));
        self.check_writable()?;
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(FinSyncError::StoreFailure("injected update failure".into()));
        }
        let mut events = self.events.lock().unwrap();
        if let Some(provider_id) = patch.provider_id.as_deref() {
            if provider_id_taken(&events, provider_id, Some(id)) {
                return Err(FinSyncError::StoreFailure(format!(
                    "provider id {provider_id} already linked"
                )));
            }
        }
        let event = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| FinSyncError::NotFound(format!("event {id}")))?;
        patch.apply_to(event);
        Ok(())
    }

    async fn link_provider(
        &self,
        id: &str,
        provider_id: &str,
        synced_at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        self.record(format!("store.link:{id}"));
        self.check_writable()?;
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(FinSyncError::StoreFailure("injected update failure".into()));
        }
        let mut events = self.events.lock().unwrap();
        if provider_id_taken(&events, provider_id, Some(id)) {
            return Err(FinSyncError::StoreFailure(format!(
                "provider id {provider_id} already linked"
            )));
        }
        let event = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| FinSyncError::NotFound(format!("event {id}")))?;
        if event.provider_id().is_some_and(|current| current != provider_id) {
            return Ok(false);
        }
        event.sync.provider_id = Some(provider_id.to_string());
        event.sync.source = SyncSource::Bidirectional;
        event.sync.last_synced_at = Some(synced_at);
        Ok(true)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.record(format!("store.delete:{id}"));
        self.check_writable()?;
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            return Err(FinSyncError::NotFound(format!("event {id}")));
        }
        Ok(())
    }
}
