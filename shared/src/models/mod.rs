//! Data models
//!
//! Shared between the storefront service and its tooling.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.

pub mod business_hours;
pub mod setting;

// Re-exports
pub use business_hours::*;
pub use setting::*;
