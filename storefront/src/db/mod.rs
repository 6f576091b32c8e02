//! Settings store
//!
//! Key-value access to the `settings` table plus its change feed. The
//! business-hours engine only ever touches the row keyed `businessHours`.

pub mod memory;
pub mod postgres;

pub use memory::MemorySettingsStore;
pub use postgres::PgSettingsStore;

use async_trait::async_trait;
use serde_json::Value;
use shared::models::SettingRow;
use thiserror::Error;
use tokio::sync::mpsc;

/// Capacity of a change subscription before notifications are dropped
pub const CHANGE_BUFFER: usize = 32;

/// Settings store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    /// The store refused the write (permission, constraint, ...)
    #[error("Write rejected: {0}")]
    Rejected(String),

    #[error("Change feed unavailable: {0}")]
    FeedUnavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StoreError::Rejected(db_err.to_string()),
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Result type for settings store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A settings row was inserted or updated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    pub key: String,
}

/// Receiving half of a change feed
///
/// `recv` yields `None` once the feed is gone; callers fall back to
/// periodic refresh.
#[derive(Debug)]
pub struct ChangeSubscription {
    rx: mpsc::Receiver<SettingChange>,
}

impl ChangeSubscription {
    pub fn channel() -> (mpsc::Sender<SettingChange>, Self) {
        let (tx, rx) = mpsc::channel(CHANGE_BUFFER);
        (tx, Self { rx })
    }

    pub async fn recv(&mut self) -> Option<SettingChange> {
        self.rx.recv().await
    }
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// All rows stored under `key`, most recently updated first.
    ///
    /// More than one row is a data-integrity problem; it is reported here
    /// so migration tooling can refuse to continue.
    async fn fetch_all(&self, key: &str) -> StoreResult<Vec<SettingRow>>;

    /// Whole-row overwrite keyed by `key` (last writer wins)
    async fn upsert(&self, key: &str, value: Value) -> StoreResult<SettingRow>;

    /// Subscribe to change notifications for every key
    async fn subscribe(&self) -> StoreResult<ChangeSubscription>;

    /// The row for `key`, tolerating duplicates by reading the newest one
    async fn fetch(&self, key: &str) -> StoreResult<Option<SettingRow>> {
        let mut rows = self.fetch_all(key).await?;
        if rows.len() > 1 {
            tracing::warn!(
                key = %key,
                count = rows.len(),
                "Duplicate settings rows found, using the most recently updated"
            );
        }
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }
}
