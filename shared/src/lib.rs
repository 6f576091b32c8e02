//! Shared types for the pizzeria storefront
//!
//! Business-hours data model, settings rows, the unified error system
//! and small time helpers used by the service and its tooling.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use models::{BUSINESS_HOURS_KEY, DayHours, SettingRow, TimePeriod, WeeklySchedule};
