//! Provider-side event representation
//!
//! Normalized form of the external calendar's events. The HTTP adapter parses
//! the wire format into these types; the converter maps them to local events.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Start or end of a provider event: an all-day date or a zoned date-time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEventTime {
    pub date: Option<NaiveDate>,
    pub date_time: Option<DateTime<FixedOffset>>,
}

impl ProviderEventTime {
    pub fn all_day(date: NaiveDate) -> Self {
        Self { date: Some(date), date_time: None }
    }

    pub fn at(date_time: DateTime<FixedOffset>) -> Self {
        Self { date: None, date_time: Some(date_time) }
    }
}

/// Read-only event as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: ProviderEventTime,
    pub end: Option<ProviderEventTime>,
}

impl ProviderEvent {
    /// Calendar day the event falls on, in the event's own offset.
    ///
    /// An all-day date wins over a date-time when both are present.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.start.date.or_else(|| self.start.date_time.map(|dt| dt.date_naive()))
    }

    pub fn is_all_day(&self) -> bool {
        self.start.date.is_some()
    }
}

/// Event content pushed to the provider when exporting a local event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEventDraft {
    pub summary: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    /// `HH:MM` or `HH:MM:SS`; all-day when absent.
    pub time: Option<String>,
}
