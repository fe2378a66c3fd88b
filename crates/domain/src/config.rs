//! Configuration structures
//!
//! Loaded by `finsync_infra::config` from environment variables or
//! JSON/TOML files.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALENDAR_ID, DEFAULT_CYCLE_TIMEOUT_SECS, DEFAULT_PROVIDER_API_BASE,
    DEFAULT_SYNC_INTERVAL_SECS, MAX_EVENT_DISTANCE_DAYS, SYNC_LOOKAHEAD_DAYS, SYNC_LOOKBACK_DAYS,
};

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Local event store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// How the import cycle treats a second provider event whose content matches
/// a local record that is already linked to a different provider event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// First writer wins; the later provider event is dropped and logged.
    #[default]
    Skip,
    /// Import the later provider event as its own local record.
    ImportSeparately,
}

/// Import cycle and scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Provider integration switch; when false no cycle touches the provider.
    pub enabled: bool,
    pub interval_seconds: u64,
    pub lookback_days: i64,
    pub lookahead_days: i64,
    /// Events further than this from "now" are ignored even when returned.
    pub max_distance_days: i64,
    pub cycle_timeout_seconds: u64,
    pub conflict_policy: ConflictPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: DEFAULT_SYNC_INTERVAL_SECS,
            lookback_days: SYNC_LOOKBACK_DAYS,
            lookahead_days: SYNC_LOOKAHEAD_DAYS,
            max_distance_days: MAX_EVENT_DISTANCE_DAYS,
            cycle_timeout_seconds: DEFAULT_CYCLE_TIMEOUT_SECS,
            conflict_policy: ConflictPolicy::Skip,
        }
    }
}

/// Calendar provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub calendar_id: String,
    pub api_base_url: String,
    /// Access token supplied externally; refresh is not handled here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            api_base_url: DEFAULT_PROVIDER_API_BASE.to_string(),
            access_token: None,
        }
    }
}

fn default_pool_size() -> u32 {
    4
}
