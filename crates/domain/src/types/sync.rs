//! Import cycle window, report and notifications

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Time range of provider events fetched per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl SyncWindow {
    /// `[now - lookback_days, now + lookahead_days]`
    pub fn around(now: DateTime<Utc>, lookback_days: i64, lookahead_days: i64) -> Self {
        Self {
            time_min: now - Duration::days(lookback_days),
            time_max: now + Duration::days(lookahead_days),
        }
    }
}

/// Whole days between `date` and the calendar day of `now`, ignoring sign.
pub fn days_from(now: DateTime<Utc>, date: NaiveDate) -> i64 {
    (date - now.date_naive()).num_days().abs()
}

/// Outcome counters for one import cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub fetched: usize,
    /// New local events created.
    pub imported: usize,
    /// Native events upgraded to bidirectional by content match.
    pub linked: usize,
    pub already_linked: usize,
    pub out_of_window: usize,
    pub unmappable: usize,
    /// Provider events dropped because their match is linked elsewhere.
    pub conflicts: usize,
    pub failed: usize,
    /// Provider listing failed; nothing was processed.
    pub fetch_failed: bool,
    /// Set when the cycle returned early because another was in flight.
    pub skipped_reentrant: bool,
}

impl ImportReport {
    pub fn reentrant_skip() -> Self {
        Self { skipped_reentrant: true, ..Self::default() }
    }
}

/// Notification published to the presentation layer after an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncNotice {
    pub imported: usize,
    pub at: DateTime<Utc>,
}
