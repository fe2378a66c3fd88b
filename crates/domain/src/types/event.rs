//! Local event model
//!
//! [`Event`] is the application's authoritative record. Sync metadata lives in
//! [`SyncMetadata`] so that linkage changes can be expressed without touching
//! user-owned fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Where a local event came from and how it relates to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncSource {
    /// Created by a user action; no provider linkage.
    #[default]
    Native,
    /// Created by the import cycle from a provider event.
    Provider,
    /// Native event later linked to a provider event.
    Bidirectional,
}

impl_domain_status_conversions!(SyncSource {
    Native => "native",
    Provider => "provider",
    Bidirectional => "bidirectional",
});

/// Semantic category of a financial calendar event.
///
/// Advisory metadata; never used by matching or linkage decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Payment,
    Income,
    Deadline,
    Reminder,
}

impl_domain_status_conversions!(EventType {
    Payment => "payment",
    Income => "income",
    Deadline => "deadline",
    Reminder => "reminder",
});

/// Sync metadata tracking an event's relationship to a provider event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    /// Provider identifier; unique across local events when present.
    pub provider_id: Option<String>,
    pub source: SyncSource,
    /// Monotonic counter bumped on every sync-relevant write.
    pub version: i64,
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Authoritative local calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    /// Time of day as `HH:MM` or `HH:MM:SS`; `None` for all-day entries.
    pub time: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub sync: SyncMetadata,
}

impl Event {
    pub fn provider_id(&self) -> Option<&str> {
        self.sync.provider_id.as_deref()
    }

    pub fn is_linked(&self) -> bool {
        self.sync.provider_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Parameters for creating a local event; the store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub provider_id: Option<String>,
    pub source: SyncSource,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl NewEvent {
    /// A user-created event with no provider linkage.
    pub fn native(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
            time: None,
            description: None,
            event_type: None,
            provider_id: None,
            source: SyncSource::Native,
            last_synced_at: None,
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }
}

/// Partial update applied through `EventStore::update`.
///
/// `None` leaves a field untouched. Nested options (`Some(None)`) clear the
/// field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub event_type: Option<Option<EventType>>,
    pub provider_id: Option<String>,
    pub source: Option<SyncSource>,
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Increment `sync.version` as part of this update.
    #[serde(default)]
    pub bump_version: bool,
}

impl EventPatch {
    /// Sync-metadata-only patch attaching a provider identifier.
    pub fn link(provider_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            provider_id: Some(provider_id.into()),
            source: Some(SyncSource::Bidirectional),
            last_synced_at: Some(at),
            ..Self::default()
        }
    }

    /// True when the patch changes user-owned fields.
    pub fn touches_content(&self) -> bool {
        self.title.is_some()
            || self.date.is_some()
            || self.time.is_some()
            || self.description.is_some()
            || self.event_type.is_some()
    }

    /// Apply the patch to an in-memory event.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title.clone_from(title);
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(time) = &self.time {
            event.time.clone_from(time);
        }
        if let Some(description) = &self.description {
            event.description.clone_from(description);
        }
        if let Some(event_type) = self.event_type {
            event.event_type = event_type;
        }
        if let Some(provider_id) = &self.provider_id {
            event.sync.provider_id = Some(provider_id.clone());
        }
        if let Some(source) = self.source {
            event.sync.source = source;
        }
        if let Some(at) = self.last_synced_at {
            event.sync.last_synced_at = Some(at);
        }
        if self.bump_version {
            event.sync.version += 1;
        }
    }
}

/// Read access to the fields the similarity matcher compares.
///
/// Implemented for stored events and for converted candidates so both sides
/// of a comparison can be either shape.
pub trait EventDescriptor {
    fn title(&self) -> &str;
    fn date(&self) -> NaiveDate;
    fn time(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
    fn event_type(&self) -> Option<EventType>;
    fn provider_id(&self) -> Option<&str>;
}

impl EventDescriptor for Event {
    fn title(&self) -> &str {
        &self.title
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn event_type(&self) -> Option<EventType> {
        self.event_type
    }

    fn provider_id(&self) -> Option<&str> {
        self.sync.provider_id.as_deref().filter(|id| !id.is_empty())
    }
}

impl EventDescriptor for NewEvent {
    fn title(&self) -> &str {
        &self.title
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn event_type(&self) -> Option<EventType> {
        self.event_type
    }

    fn provider_id(&self) -> Option<&str> {
        self.provider_id.as_deref().filter(|id| !id.is_empty())
    }
}
