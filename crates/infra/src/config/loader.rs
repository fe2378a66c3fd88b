//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `FINSYNC_DB_PATH` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `FINSYNC_DB_PATH`: Database file path (required)
//! - `FINSYNC_DB_POOL_SIZE`: Connection pool size
//! - `FINSYNC_SYNC_ENABLED`: Whether provider sync is enabled (true/false)
//! - `FINSYNC_SYNC_INTERVAL`: Sync interval in seconds
//! - `FINSYNC_SYNC_LOOKBACK_DAYS` / `FINSYNC_SYNC_LOOKAHEAD_DAYS`: Window
//! - `FINSYNC_SYNC_MAX_DISTANCE_DAYS`: Distance bound for provider events
//! - `FINSYNC_SYNC_CYCLE_TIMEOUT`: Per-cycle timeout in seconds
//! - `FINSYNC_SYNC_CONFLICT_POLICY`: `skip` or `import_separately`
//! - `FINSYNC_CALENDAR_ID`: Provider calendar identifier
//! - `FINSYNC_PROVIDER_API_BASE`: Provider API base URL
//! - `FINSYNC_ACCESS_TOKEN`: Provider access token
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` then `./finsync.{json,toml}`
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use finsync_domain::{
    Config, ConflictPolicy, DatabaseConfig, FinSyncError, ProviderConfig, Result, SyncConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `FinSyncError::Config` if configuration cannot be loaded from
/// either source or is invalid.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `FINSYNC_DB_PATH` is required; every other value falls back to its
/// default.
///
/// # Errors
/// Returns `FinSyncError::Config` if the database path is missing or a
/// value cannot be parsed.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("FINSYNC_DB_PATH")?;
    let sync_defaults = SyncConfig::default();
    let provider_defaults = ProviderConfig::default();

    let database = DatabaseConfig {
        path: db_path,
        pool_size: env_parse("FINSYNC_DB_POOL_SIZE", "pool size")?.unwrap_or(4),
    };

    let sync = SyncConfig {
        enabled: env_bool("FINSYNC_SYNC_ENABLED", sync_defaults.enabled),
        interval_seconds: env_parse("FINSYNC_SYNC_INTERVAL", "sync interval")?
            .unwrap_or(sync_defaults.interval_seconds),
        lookback_days: env_parse("FINSYNC_SYNC_LOOKBACK_DAYS", "lookback days")?
            .unwrap_or(sync_defaults.lookback_days),
        lookahead_days: env_parse("FINSYNC_SYNC_LOOKAHEAD_DAYS", "lookahead days")?
            .unwrap_or(sync_defaults.lookahead_days),
        max_distance_days: env_parse("FINSYNC_SYNC_MAX_DISTANCE_DAYS", "max distance days")?
            .unwrap_or(sync_defaults.max_distance_days),
        cycle_timeout_seconds: env_parse("FINSYNC_SYNC_CYCLE_TIMEOUT", "cycle timeout")?
            .unwrap_or(sync_defaults.cycle_timeout_seconds),
        conflict_policy: match std::env::var("FINSYNC_SYNC_CONFLICT_POLICY").ok() {
            Some(raw) => parse_conflict_policy(&raw)?,
            None => sync_defaults.conflict_policy,
        },
    };

    let provider = ProviderConfig {
        calendar_id: std::env::var("FINSYNC_CALENDAR_ID").unwrap_or(provider_defaults.calendar_id),
        api_base_url: std::env::var("FINSYNC_PROVIDER_API_BASE")
            .unwrap_or(provider_defaults.api_base_url),
        access_token: std::env::var("FINSYNC_ACCESS_TOKEN").ok().filter(|t| !t.is_empty()),
    };

    Ok(Config { database, sync, provider })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `FinSyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(FinSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            FinSyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| FinSyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| FinSyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| FinSyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(FinSyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 8] = [
        "config.json",
        "config.toml",
        "finsync.json",
        "finsync.toml",
        "../config.json",
        "../config.toml",
        "../../config.json",
        "../../config.toml",
    ];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `FinSyncError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| FinSyncError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional numeric environment variable
fn env_parse<T>(key: &str, label: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| FinSyncError::Config(format!("Invalid {label}: {e}"))),
        Err(_) => Ok(None),
    }
}

fn parse_conflict_policy(raw: &str) -> Result<ConflictPolicy> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "skip" => Ok(ConflictPolicy::Skip),
        "import_separately" => Ok(ConflictPolicy::ImportSeparately),
        other => Err(FinSyncError::Config(format!("Invalid conflict policy: {other}"))),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
