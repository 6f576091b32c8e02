//! Shared application state

use std::sync::Arc;

use crate::core::config::{BoxError, Config};
use crate::db::{MemorySettingsStore, PgSettingsStore, SettingsStore};
use crate::hours::BusinessHoursEngine;

/// State handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BusinessHoursEngine>,
    pub store: Arc<dyn SettingsStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect the configured store and build the engine around it
    pub async fn new(config: Config) -> Result<Self, BoxError> {
        let store: Arc<dyn SettingsStore> = match &config.database_url {
            Some(url) => {
                let store = PgSettingsStore::connect(url, config.database_max_connections).await?;
                store.run_migrations().await?;
                tracing::info!("Connected to PostgreSQL settings store");
                Arc::new(store)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory settings store");
                Arc::new(MemorySettingsStore::new())
            }
        };
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn SettingsStore>) -> Self {
        let engine = Arc::new(BusinessHoursEngine::new(
            Arc::clone(&store),
            config.engine_options(),
        ));
        Self::from_parts(config, store, engine)
    }

    pub fn from_parts(
        config: Config,
        store: Arc<dyn SettingsStore>,
        engine: Arc<BusinessHoursEngine>,
    ) -> Self {
        Self {
            engine,
            store,
            config: Arc::new(config),
        }
    }
}
