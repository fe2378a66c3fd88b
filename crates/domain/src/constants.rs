//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Sync window (days relative to "now")
pub const SYNC_LOOKBACK_DAYS: i64 = 30;
pub const SYNC_LOOKAHEAD_DAYS: i64 = 60;
pub const MAX_EVENT_DISTANCE_DAYS: i64 = 90;

// Scheduler defaults
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_CYCLE_TIMEOUT_SECS: u64 = 120;

// Provider defaults
pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_PROVIDER_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Phrases the provider integration injects into descriptions.
///
/// Stripped (case-insensitive) before descriptions are compared.
pub const PROVIDER_BOILERPLATE_PHRASES: [&str; 4] = [
    "imported from google calendar",
    "exported to google calendar",
    "imported from provider",
    "exported to provider",
];

/// Phrase appended to descriptions of events pushed to the provider.
pub const EXPORT_BOILERPLATE: &str = "Exported to Google Calendar";

/// Title given to provider events that carry no summary.
pub const UNTITLED_EVENT_TITLE: &str = "(No title)";

// Event emission
pub const EVENT_SYNC_IMPORTED: &str = "calendar-events-imported";
