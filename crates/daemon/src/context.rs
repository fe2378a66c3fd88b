//! Application context - dependency injection container

use std::path::Path;
use std::sync::Arc;

use finsync_core::{EventStore, ImportCycle, ImportSettings, ProviderClient};
use finsync_domain::{Config, FinSyncError, Result};
use finsync_infra::{
    AccessTokenSource, BroadcastViewRefresh, DbManager, GoogleCalendarProvider,
    SqliteEventRepository, StaticTokenSource, SyncMetrics, SyncScheduler, SyncSchedulerConfig,
};
use tracing::{info, warn};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub db: Arc<DbManager>,
    pub import_cycle: Arc<ImportCycle>,
    pub view_refresh: BroadcastViewRefresh,
    pub metrics: Arc<SyncMetrics>,
    pub scheduler: SyncScheduler,
    /// Sync is configured on and a provider token is available
    pub provider_enabled: bool,
}

impl AppContext {
    pub fn new(config: &Config) -> Result<Self> {
        let db = Arc::new(open_database(config)?);
        let store: Arc<dyn EventStore> = Arc::new(SqliteEventRepository::new(Arc::clone(&db)));

        let token = config.provider.access_token.clone().filter(|t| !t.trim().is_empty());
        let provider_enabled = config.sync.enabled && token.is_some();
        if config.sync.enabled && !provider_enabled {
            warn!("FINSYNC_ACCESS_TOKEN not set; provider sync disabled");
        }

        let tokens: Arc<dyn AccessTokenSource> =
            Arc::new(StaticTokenSource::new(token.unwrap_or_default()));
        let provider: Arc<dyn ProviderClient> =
            Arc::new(GoogleCalendarProvider::new(&config.provider, tokens)?);

        let view_refresh = BroadcastViewRefresh::new();
        let import_cycle = Arc::new(ImportCycle::new(
            store,
            provider,
            Arc::new(view_refresh.clone()),
            ImportSettings::from(&config.sync),
        ));

        let metrics = Arc::new(SyncMetrics::new());
        let scheduler_config = SyncSchedulerConfig {
            enabled: provider_enabled,
            ..SyncSchedulerConfig::from(&config.sync)
        };
        let scheduler =
            SyncScheduler::new(Arc::clone(&import_cycle), scheduler_config, Arc::clone(&metrics));

        info!(
            db_path = %db.path().display(),
            calendar_id = %config.provider.calendar_id,
            provider_enabled,
            "application context initialised"
        );

        Ok(Self { db, import_cycle, view_refresh, metrics, scheduler, provider_enabled })
    }
}

fn open_database(config: &Config) -> Result<DbManager> {
    let path = Path::new(&config.database.path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| {
            let dir = parent.display();
            FinSyncError::Config(format!("cannot create database directory {dir}: {err}"))
        })?;
    }

    let db = DbManager::new(path, config.database.pool_size)?;
    db.run_migrations()?;
    db.health_check()?;
    Ok(db)
}
