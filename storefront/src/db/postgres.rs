//! PostgreSQL settings store

use async_trait::async_trait;
use serde_json::Value;
use shared::models::SettingRow;
use sqlx::PgPool;
use sqlx::postgres::{PgListener, PgPoolOptions};

use super::{ChangeSubscription, SettingChange, SettingsStore, StoreError, StoreResult};

/// Channel the `settings` trigger publishes changed keys on
pub const CHANGE_CHANNEL: &str = "settings_changed";

#[derive(Clone)]
pub struct PgSettingsStore {
    pool: PgPool,
}

impl PgSettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema migrations (table + notify trigger)
    pub async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn fetch_all(&self, key: &str) -> StoreResult<Vec<SettingRow>> {
        let rows: Vec<SettingRow> = sqlx::query_as(
            r#"
            SELECT key, value, updated_at
            FROM settings
            WHERE key = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn upsert(&self, key: &str, value: Value) -> StoreResult<SettingRow> {
        let row: SettingRow = sqlx::query_as(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            RETURNING key, value, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn subscribe(&self) -> StoreResult<ChangeSubscription> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(|e| StoreError::FeedUnavailable(e.to_string()))?;
        listener
            .listen(CHANGE_CHANNEL)
            .await
            .map_err(|e| StoreError::FeedUnavailable(e.to_string()))?;

        let (tx, subscription) = ChangeSubscription::channel();
        tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        let change = SettingChange {
                            key: notification.payload().to_string(),
                        };
                        if tx.send(change).await.is_err() {
                            // Subscriber dropped
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Settings change listener stopped");
                        break;
                    }
                }
            }
        });

        tracing::debug!(channel = CHANGE_CHANNEL, "Listening for settings changes");
        Ok(subscription)
    }
}
