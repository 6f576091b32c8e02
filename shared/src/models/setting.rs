//! Settings Row Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the key-value `settings` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SettingRow {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
