//! Schedule cache owned by the engine
//!
//! Freshness is a pure function of the cached fetch time, the TTL and the
//! instant supplied by the engine's clock.
//!
//! Writers take a ticket before reading the store and commit with it
//! afterwards. A commit older than the last applied one is discarded, so a
//! slow load cannot overwrite a schedule saved while it was in flight.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use shared::models::WeeklySchedule;

/// Where the cached schedule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    /// Read from the settings row
    Stored,
    /// Built-in default after a failed, empty or unrecognized read
    Fallback,
}

#[derive(Debug, Clone)]
pub struct CachedSchedule {
    pub data: Arc<WeeklySchedule>,
    pub fetched_at: DateTime<Utc>,
    pub source: ScheduleSource,
}

#[derive(Debug)]
pub struct ScheduleCache {
    ttl: Duration,
    entry: Option<CachedSchedule>,
    issued: u64,
    applied: u64,
}

/// Position of a load in start order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl ScheduleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: None,
            issued: 0,
            applied: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Entry exists and `now` lies within `[fetched_at, fetched_at + ttl)`.
    /// A clock that moved backwards counts as stale.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match &self.entry {
            Some(entry) => {
                let age = now.signed_duration_since(entry.fetched_at);
                age >= Duration::zero() && age < self.ttl
            }
            None => false,
        }
    }

    pub fn get(&self, now: DateTime<Utc>) -> Option<Arc<WeeklySchedule>> {
        if self.is_fresh(now) {
            self.entry.as_ref().map(|e| Arc::clone(&e.data))
        } else {
            None
        }
    }

    pub fn store(
        &mut self,
        data: Arc<WeeklySchedule>,
        fetched_at: DateTime<Utc>,
        source: ScheduleSource,
    ) {
        self.entry = Some(CachedSchedule {
            data,
            fetched_at,
            source,
        });
    }

    /// Reserve a ticket; call before reading the store
    pub fn begin(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    /// Store `data` unless a later ticket has already been committed.
    /// Returns the schedule now current in the cache.
    pub fn commit(
        &mut self,
        ticket: LoadTicket,
        data: Arc<WeeklySchedule>,
        fetched_at: DateTime<Utc>,
        source: ScheduleSource,
    ) -> Arc<WeeklySchedule> {
        if ticket.0 > self.applied {
            self.applied = ticket.0;
            self.store(Arc::clone(&data), fetched_at, source);
            return data;
        }
        match &self.entry {
            Some(entry) => Arc::clone(&entry.data),
            None => data,
        }
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn entry(&self) -> Option<&CachedSchedule> {
        self.entry.as_ref()
    }
}
