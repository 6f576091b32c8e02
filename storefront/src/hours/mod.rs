//! Business hours
//!
//! - [`engine`] - cached schedule access and open/closed queries
//! - [`evaluate`] - pure evaluation over a canonical schedule
//! - [`containment`] - interval containment with midnight wraparound
//! - [`format`] - localized display text
//! - [`refresher`] - change-feed and periodic cache refresh

pub mod cache;
pub mod clock;
pub mod containment;
pub mod engine;
pub mod evaluate;
pub mod format;
pub mod refresher;

pub use cache::ScheduleSource;
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{BusinessHoursEngine, EngineOptions};
pub use evaluate::{OpenStatus, OrderTimeValidation};
pub use format::Locale;
pub use refresher::ScheduleRefresher;
