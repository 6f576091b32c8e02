//! Core - configuration, state and background tasks
//!
//! - [`Config`] - environment configuration
//! - [`AppState`] - state shared by the HTTP handlers
//! - [`BackgroundTasks`] - task registration and shutdown

pub mod config;
pub mod state;
pub mod tasks;

pub use config::{BoxError, Config};
pub use state::AppState;
pub use tasks::{BackgroundTasks, TaskKind};
