//! FinSync - financial calendar sync daemon
//!
//! Opens the local event store, runs an initial import and then keeps the
//! store reconciled with the calendar provider until Ctrl-C.

mod context;

use anyhow::Context;
use finsync_infra::config;
use finsync_infra::observability::{init_tracing, json_logs_requested};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::context::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before tracing so RUST_LOG from the file applies
    let dotenv = dotenvy::dotenv();
    init_tracing(json_logs_requested())?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => debug!(error = %err, "No .env file loaded"),
    }

    let config = config::load().context("failed to load configuration")?;
    let mut ctx = AppContext::new(&config).context("failed to initialise application")?;

    let mut notices = ctx.view_refresh.subscribe();
    let listener = tokio::spawn(async move {
        loop {
            match notices.recv().await {
                Ok(notice) => {
                    info!(imported = notice.imported, at = %notice.at, "Calendar updated")
                }
                Err(RecvError::Lagged(missed)) => warn!(missed, "Dropped view refresh notices"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    if ctx.provider_enabled {
        let report = ctx.import_cycle.run_once_with_report().await;
        info!(?report, "Initial import finished");
    }

    ctx.scheduler.start().await?;
    info!("FinSync running; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    info!("Shutdown requested");

    ctx.scheduler.stop().await?;
    listener.abort();

    let snapshot = ctx.metrics.snapshot();
    info!(
        db_path = %ctx.db.path().display(),
        cycles = snapshot.cycles_completed,
        skipped = snapshot.cycles_skipped,
        timed_out = snapshot.cycles_timed_out,
        imported = snapshot.events_imported,
        linked = snapshot.events_linked,
        failed = snapshot.events_failed,
        avg_cycle_ms = ctx.metrics.avg_cycle_time_ms().unwrap_or_default(),
        "FinSync stopped"
    );

    Ok(())
}
