//! Storefront - business hours service of the pizzeria's online ordering
//!
//! ```text
//! storefront/src/
//! ├── core/          # config, shared state, background tasks
//! ├── db/            # settings store (PostgreSQL, in-memory) + change feed
//! ├── hours/         # business-hours engine, evaluation, formatting
//! ├── api/           # HTTP routes and handlers
//! ├── migration.rs   # legacy schedule migration
//! ├── server.rs      # HTTP server lifecycle
//! └── utils/         # logging
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod hours;
pub mod migration;
pub mod server;
pub mod utils;

pub use self::core::{AppState, BoxError, Config};
pub use hours::{BusinessHoursEngine, EngineOptions};
pub use utils::logger::init_logger;
