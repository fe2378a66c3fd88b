//! Tracing subscriber setup for binaries.
//!
//! Filtering follows `RUST_LOG` and defaults to `info`. Set
//! `FINSYNC_LOG_JSON=true` for JSON lines output.

use finsync_domain::{FinSyncError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Whether `FINSYNC_LOG_JSON` asks for JSON output.
pub fn json_logs_requested() -> bool {
    std::env::var("FINSYNC_LOG_JSON")
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(json: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    installed.map_err(|err| FinSyncError::Internal(format!("tracing already initialised: {err}")))
}
