use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::warn;
use vidcat_core::{
    load_registry, run_pass, CatalogStore, ChannelFetcher, ChannelRegistry, Config, PassError,
    RegistryError, SanitizedConfig, SyncEngine, SyncOptions, SyncOutcome, SyncReport,
};

/// Why a requested sync pass did not complete normally.
#[derive(Debug, thiserror::Error)]
pub enum SyncRunError {
    #[error("A sync pass is already running")]
    Busy,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Pass(#[from] PassError),
}

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn CatalogStore>,
    engine: SyncEngine,
    sync_lock: Mutex<()>,
    last_report: RwLock<Option<SyncReport>>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn CatalogStore>,
        fetcher: Arc<dyn ChannelFetcher>,
    ) -> Self {
        let engine = SyncEngine::new(fetcher, SyncOptions::from(&config.sync));
        Self {
            config,
            store,
            engine,
            sync_lock: Mutex::new(()),
            last_report: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    pub fn registry_path(&self) -> &Path {
        &self.config.paths.registry
    }

    /// Read the registry document. It is re-read on every call so edits
    /// take effect without a restart.
    pub fn registry(&self) -> Result<ChannelRegistry, RegistryError> {
        load_registry(self.registry_path())
    }

    pub fn is_syncing(&self) -> bool {
        self.sync_lock.try_lock().is_err()
    }

    pub async fn last_report(&self) -> Option<SyncReport> {
        self.last_report.read().await.clone()
    }

    /// Run one pass unless another one is in progress.
    ///
    /// The report is remembered even when saving fails.
    pub async fn run_sync(&self) -> Result<SyncOutcome, SyncRunError> {
        let _guard = self.sync_lock.try_lock().map_err(|_| SyncRunError::Busy)?;
        let registry = self.registry()?;

        let result = run_pass(&self.engine, self.store.as_ref(), &registry).await;
        let report = match &result {
            Ok(outcome) => outcome.report.clone(),
            Err(e) => {
                warn!(error = %e, "Sync pass finished without saving");
                e.outcome().report.clone()
            }
        };
        *self.last_report.write().await = Some(report);

        result.map_err(SyncRunError::from)
    }
}
