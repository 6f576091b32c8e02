//! In-memory settings store
//!
//! Used when no `DATABASE_URL` is configured and throughout the tests.
//! Failure switches let callers simulate an unreachable or read-only store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use shared::models::SettingRow;
use tokio::sync::mpsc;

use super::{ChangeSubscription, SettingChange, SettingsStore, StoreError, StoreResult};

#[derive(Default)]
pub struct MemorySettingsStore {
    rows: RwLock<Vec<SettingRow>>,
    subscribers: Mutex<Vec<mpsc::Sender<SettingChange>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    feed_disabled: AtomicBool,
    reads: AtomicUsize,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a single row
    pub fn with_value(key: &str, value: Value) -> Self {
        let store = Self::new();
        store.insert_row(SettingRow {
            key: key.to_string(),
            value,
            updated_at: Utc::now(),
        });
        store
    }

    /// Append a row without any uniqueness check (mirrors legacy tables
    /// created before the primary key existed)
    pub fn insert_row(&self, row: SettingRow) {
        self.rows.write().push(row);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `subscribe` fail, as a backend without notifications would
    pub fn set_feed_disabled(&self, disabled: bool) {
        self.feed_disabled.store(disabled, Ordering::SeqCst);
    }

    /// Number of `fetch_all` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Replace the stored value without notifying subscribers
    pub fn overwrite_silently(&self, key: &str, value: Value) {
        let mut rows = self.rows.write();
        rows.retain(|r| r.key != key);
        rows.push(SettingRow {
            key: key.to_string(),
            value,
            updated_at: Utc::now(),
        });
    }

    /// Publish a change for `key` to every live subscriber
    pub fn notify(&self, key: &str) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| {
            match tx.try_send(SettingChange {
                key: key.to_string(),
            }) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(key = %key, "Change subscriber lagging, notification dropped");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn fetch_all(&self, key: &str) -> StoreResult<Vec<SettingRow>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Database("settings store unreachable".into()));
        }

        let mut rows: Vec<SettingRow> = self
            .rows
            .read()
            .iter()
            .filter(|r| r.key == key)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn upsert(&self, key: &str, value: Value) -> StoreResult<SettingRow> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(
                "permission denied for table settings".into(),
            ));
        }

        let row = SettingRow {
            key: key.to_string(),
            value,
            updated_at: Utc::now(),
        };
        {
            let mut rows = self.rows.write();
            rows.retain(|r| r.key != key);
            rows.push(row.clone());
        }
        self.notify(key);
        Ok(row)
    }

    async fn subscribe(&self) -> StoreResult<ChangeSubscription> {
        if self.feed_disabled.load(Ordering::SeqCst) {
            return Err(StoreError::FeedUnavailable(
                "notifications not supported".into(),
            ));
        }
        let (tx, subscription) = ChangeSubscription::channel();
        self.subscribers.lock().push(tx);
        Ok(subscription)
    }
}
