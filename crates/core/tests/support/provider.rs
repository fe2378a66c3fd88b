use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use finsync_core::ProviderClient;
use finsync_domain::{
    FinSyncError, ProviderEvent, ProviderEventDraft, ProviderEventTime, Result as DomainResult,
};
use tokio::sync::Notify;

use super::Journal;

/// All-day provider event.
pub fn all_day(id: &str, summary: &str, date: NaiveDate) -> ProviderEvent {
    ProviderEvent {
        id: id.into(),
        summary: Some(summary.into()),
        description: None,
        start: ProviderEventTime::all_day(date),
        end: None,
    }
}

/// Holds `list_events` open until released, to keep a cycle in flight.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// Provider mock returning a fixed script of events.
#[derive(Default, Clone)]
pub struct ScriptedProvider {
    events: Arc<Mutex<Vec<ProviderEvent>>>,
    list_calls: Arc<AtomicUsize>,
    windows: Arc<Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    created: Arc<Mutex<Vec<ProviderEventDraft>>>,
    fail_list: Arc<AtomicBool>,
    fail_delete: Arc<AtomicBool>,
    gate: Option<Arc<Gate>>,
    journal: Option<Journal>,
}

impl ScriptedProvider {
    pub fn new(events: Vec<ProviderEvent>) -> Self {
        Self { events: Arc::new(Mutex::new(events)), ..Self::default() }
    }

    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn push(&self, event: ProviderEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn windows(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.windows.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<ProviderEventDraft> {
        self.created.lock().unwrap().clone()
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    fn record(&self, entry: String) {
        if let Some(journal) = &self.journal {
            journal.lock().unwrap().push(entry);
        }
    }
}

#[async_trait]
impl ProviderClient for ScriptedProvider {
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> DomainResult<Vec<ProviderEvent>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.windows.lock().unwrap().push((time_min, time_max));
        self.record("provider.list".into());

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if self.fail_list.load(Ordering::SeqCst) {
            return Err(FinSyncError::ProviderUnavailable("connection refused".into()));
        }
        Ok(self.events.lock().unwrap().clone())
    }

    async fn delete_event(&self, provider_id: &str) -> DomainResult<()> {
        self.record(format!("provider.delete:{provider_id}"));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(FinSyncError::ProviderUnavailable("timeout".into()));
        }
        self.deleted.lock().unwrap().push(provider_id.to_string());
        Ok(())
    }

    async fn create_event(&self, draft: &ProviderEventDraft) -> DomainResult<String> {
        self.record(format!("provider.create:{}", draft.summary));
        let mut created = self.created.lock().unwrap();
        created.push(draft.clone());
        Ok(format!("exported-{}", created.len()))
    }
}
