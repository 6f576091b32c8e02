//! Business-hours engine
//!
//! Reads the weekly schedule from the settings store through a TTL cache,
//! answers open/closed queries in the restaurant's time zone and saves
//! admin edits. Reads never fail: any problem loading the schedule yields
//! the built-in default. Writes surface their errors.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use parking_lot::RwLock;
use serde_json::Value;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{BUSINESS_HOURS_KEY, WeeklySchedule, weekday_key};

use super::cache::{ScheduleCache, ScheduleSource};
use super::clock::{Clock, SystemClock};
use super::evaluate::{self, OpenStatus, OrderTimeValidation};
use super::format::{self, Locale};
use crate::db::SettingsStore;

/// Engine tuning
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub cache_ttl: Duration,
    /// Restaurant time zone; all evaluation happens in local time
    pub timezone: Tz,
    /// How far in the past an order time may lie and still count as "now"
    pub order_grace: Duration,
    /// Locale of `format_hours`
    pub locale: Locale,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::minutes(5),
            timezone: chrono_tz::Europe::Rome,
            order_grace: Duration::seconds(60),
            locale: Locale::En,
        }
    }
}

pub struct BusinessHoursEngine {
    store: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    cache: RwLock<ScheduleCache>,
    options: EngineOptions,
}

impl BusinessHoursEngine {
    pub fn new(store: Arc<dyn SettingsStore>, options: EngineOptions) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), options)
    }

    pub fn with_clock(
        store: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
        options: EngineOptions,
    ) -> Self {
        let cache = RwLock::new(ScheduleCache::new(options.cache_ttl));
        Self {
            store,
            clock,
            cache,
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Cached schedule, loading it when absent or stale
    pub async fn schedule(&self) -> Arc<WeeklySchedule> {
        let cached = self.cache.read().get(self.clock.now());
        match cached {
            Some(schedule) => schedule,
            None => self.refresh().await,
        }
    }

    /// Bypass the cache, reload and re-populate it
    ///
    /// A load that finishes after a newer load or save has landed leaves the
    /// cache alone and returns the newer schedule.
    pub async fn refresh(&self) -> Arc<WeeklySchedule> {
        let ticket = self.cache.write().begin();
        let (schedule, source) = self.load().await;
        let data = self
            .cache
            .write()
            .commit(ticket, Arc::new(schedule), self.clock.now(), source);
        tracing::debug!(source = ?source, "Business hours cache refreshed");
        data
    }

    /// Drop the cached entry; the next read goes to the store
    pub fn invalidate(&self) {
        self.cache.write().invalidate();
    }

    /// Origin of the cached entry, if any
    pub fn cached_source(&self) -> Option<ScheduleSource> {
        self.cache.read().entry().map(|entry| entry.source)
    }

    async fn load(&self) -> (WeeklySchedule, ScheduleSource) {
        let row = match self.store.fetch(BUSINESS_HOURS_KEY).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                tracing::warn!("No business hours stored, using default schedule");
                return (WeeklySchedule::default(), ScheduleSource::Fallback);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load business hours, using default schedule");
                return (WeeklySchedule::default(), ScheduleSource::Fallback);
            }
        };

        match WeeklySchedule::from_stored(&row.value) {
            Ok(reconciled) => {
                if !reconciled.legacy_days.is_empty() {
                    tracing::debug!(
                        days = ?day_keys(&reconciled.legacy_days),
                        "Normalized legacy single-period days"
                    );
                }
                if !reconciled.invalid_days.is_empty() {
                    tracing::warn!(
                        days = ?day_keys(&reconciled.invalid_days),
                        "Unrecognized day entries treated as closed"
                    );
                }
                (reconciled.schedule, ScheduleSource::Stored)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored business hours unrecognized, using default schedule");
                (WeeklySchedule::default(), ScheduleSource::Fallback)
            }
        }
    }

    /// Wall-clock instant in the restaurant's time zone
    pub fn local_time(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.options.timezone).naive_local()
    }

    pub async fn is_open_at(&self, at: DateTime<Utc>) -> OpenStatus {
        let schedule = self.schedule().await;
        evaluate::evaluate(&schedule, self.local_time(at))
    }

    pub async fn is_open_now(&self) -> OpenStatus {
        self.is_open_at(self.clock.now()).await
    }

    /// Check a prospective order time, `None` meaning now
    pub async fn validate_order_time(&self, at: Option<DateTime<Utc>>) -> OrderTimeValidation {
        let now = self.clock.now();
        let at = at.unwrap_or(now);
        let earliest = now
            .checked_sub_signed(self.options.order_grace)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        if at < earliest {
            return OrderTimeValidation::rejected(
                ErrorCode::OrderTimeInPast,
                "Requested order time is in the past",
            );
        }

        let schedule = self.schedule().await;
        evaluate::validate_order_at(&schedule, self.local_time(at))
    }

    pub async fn format_hours(&self) -> String {
        self.format_hours_in(self.options.locale).await
    }

    pub async fn format_hours_in(&self, locale: Locale) -> String {
        let schedule = self.schedule().await;
        format::format_week(&schedule, locale)
    }

    /// Overwrite the stored schedule and cache exactly what was written
    pub async fn save_schedule(&self, schedule: WeeklySchedule) -> AppResult<Arc<WeeklySchedule>> {
        schedule.validate()?;

        self.store
            .upsert(BUSINESS_HOURS_KEY, schedule.to_value())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to save business hours");
                AppError::schedule_save_failed(e.to_string())
            })?;

        tracing::info!("Business hours saved");
        let mut cache = self.cache.write();
        let ticket = cache.begin();
        Ok(cache.commit(
            ticket,
            Arc::new(schedule),
            self.clock.now(),
            ScheduleSource::Stored,
        ))
    }

    /// Save a document in either stored shape; it is written back canonical.
    /// Every day must be present and recognizable.
    pub async fn save_document(&self, value: &Value) -> AppResult<Arc<WeeklySchedule>> {
        let reconciled = WeeklySchedule::from_stored(value)
            .map_err(|e| AppError::schedule_invalid(e.to_string()))?;
        if !reconciled.invalid_days.is_empty() {
            return Err(AppError::schedule_invalid("missing or malformed day entries")
                .with_detail("days", day_keys(&reconciled.invalid_days)));
        }
        self.save_schedule(reconciled.schedule).await
    }
}

fn day_keys(days: &[chrono::Weekday]) -> Vec<&'static str> {
    days.iter().map(|d| weekday_key(*d)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemorySettingsStore;
    use crate::hours::clock::ManualClock;
    use chrono::TimeZone;
    use serde_json::json;
    use shared::models::{DayHours, TimePeriod};

    /// Store whose first read takes its snapshot, then waits for `release`
    struct SlowFirstRead {
        inner: MemorySettingsStore,
        first: std::sync::atomic::AtomicBool,
        reached: tokio::sync::Notify,
        release: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl SettingsStore for SlowFirstRead {
        async fn fetch_all(&self, key: &str) -> crate::db::StoreResult<Vec<shared::models::SettingRow>> {
            let rows = self.inner.fetch_all(key).await;
            if self.first.swap(false, std::sync::atomic::Ordering::SeqCst) {
                self.reached.notify_one();
                self.release.notified().await;
            }
            rows
        }

        async fn upsert(&self, key: &str, value: Value) -> crate::db::StoreResult<shared::models::SettingRow> {
            self.inner.upsert(key, value).await
        }

        async fn subscribe(&self) -> crate::db::StoreResult<crate::db::ChangeSubscription> {
            self.inner.subscribe().await
        }
    }

    fn engine_with(store: Arc<MemorySettingsStore>, clock: Arc<ManualClock>) -> BusinessHoursEngine {
        BusinessHoursEngine::with_clock(store, clock, EngineOptions::default())
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[tokio::test]
    async fn test_cache_serves_until_ttl_expires() {
        let store = Arc::new(MemorySettingsStore::with_value(
            BUSINESS_HOURS_KEY,
            WeeklySchedule::default().to_value(),
        ));
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 12, 0)));
        let engine = engine_with(Arc::clone(&store), Arc::clone(&clock));

        engine.schedule().await;
        engine.schedule().await;
        assert_eq!(store.read_count(), 1);

        clock.advance(Duration::seconds(299));
        engine.schedule().await;
        assert_eq!(store.read_count(), 1);

        clock.advance(Duration::seconds(1));
        engine.schedule().await;
        assert_eq!(store.read_count(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let store = Arc::new(MemorySettingsStore::new());
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 12, 0)));
        let engine = engine_with(Arc::clone(&store), clock);

        engine.schedule().await;
        engine.invalidate();
        assert!(engine.cached_source().is_none());
        engine.schedule().await;
        assert_eq!(store.read_count(), 2);
    }

    #[tokio::test]
    async fn test_read_failure_yields_default() {
        let store = Arc::new(MemorySettingsStore::new());
        store.set_fail_reads(true);
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 12, 0)));
        let engine = engine_with(store, clock);

        let schedule = engine.schedule().await;
        assert_eq!(*schedule, WeeklySchedule::default());
        assert_eq!(engine.cached_source(), Some(ScheduleSource::Fallback));
    }

    #[tokio::test]
    async fn test_unrecognized_value_yields_default() {
        let store = Arc::new(MemorySettingsStore::with_value(
            BUSINESS_HOURS_KEY,
            json!(["not", "a", "schedule"]),
        ));
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 12, 0)));
        let engine = engine_with(store, clock);

        assert_eq!(*engine.schedule().await, WeeklySchedule::default());
    }

    #[tokio::test]
    async fn test_evaluates_in_restaurant_time_zone() {
        let mut schedule = WeeklySchedule::uniform(DayHours::closed());
        schedule.thursday = DayHours::new(
            TimePeriod::open("12:00", "14:30"),
            TimePeriod::closed("18:00", "23:00"),
        );
        let store = Arc::new(MemorySettingsStore::with_value(
            BUSINESS_HOURS_KEY,
            schedule.to_value(),
        ));
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 11, 30)));
        let engine = engine_with(store, Arc::clone(&clock));

        // 11:30 UTC is 12:30 in Rome (CET)
        assert!(engine.is_open_now().await.is_open);
        // 13:45 UTC is 14:45 in Rome
        assert!(!engine.is_open_at(utc(2025, 3, 13, 13, 45)).await.is_open);
    }

    #[tokio::test]
    async fn test_order_time_in_past_rejected() {
        let store = Arc::new(MemorySettingsStore::new());
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 11, 30)));
        let engine = engine_with(store, Arc::clone(&clock));

        let late = engine
            .validate_order_time(Some(utc(2025, 3, 13, 11, 28)))
            .await;
        assert!(!late.valid);
        assert_eq!(late.code, Some(ErrorCode::OrderTimeInPast));

        // Within the grace window counts as now (Thursday 12:29 in Rome)
        let now_ish = engine
            .validate_order_time(Some(utc(2025, 3, 13, 11, 29)))
            .await;
        assert!(now_ish.valid);

        assert!(engine.validate_order_time(None).await.valid);
    }

    #[tokio::test]
    async fn test_save_failure_surfaces_and_keeps_cache() {
        let store = Arc::new(MemorySettingsStore::new());
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 12, 0)));
        let engine = engine_with(Arc::clone(&store), clock);
        engine.schedule().await;

        store.set_fail_writes(true);
        let err = engine
            .save_schedule(WeeklySchedule::uniform(DayHours::closed()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ScheduleSaveFailed);
        assert_eq!(*engine.schedule().await, WeeklySchedule::default());
    }

    #[tokio::test]
    async fn test_slow_refresh_does_not_clobber_save() {
        let store = Arc::new(SlowFirstRead {
            inner: MemorySettingsStore::new(),
            first: std::sync::atomic::AtomicBool::new(true),
            reached: tokio::sync::Notify::new(),
            release: tokio::sync::Notify::new(),
        });
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 12, 0)));
        let engine = Arc::new(BusinessHoursEngine::with_clock(
            store.clone(),
            clock,
            EngineOptions::default(),
        ));

        // Refresh reads the empty store, then stalls
        let in_flight = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.refresh().await }
        });
        store.reached.notified().await;

        let closed = WeeklySchedule::uniform(DayHours::closed());
        engine.save_schedule(closed.clone()).await.unwrap();

        store.release.notify_one();
        let refreshed = in_flight.await.unwrap();
        assert_eq!(*refreshed, closed);
        assert_eq!(*engine.schedule().await, closed);
        assert_eq!(engine.cached_source(), Some(ScheduleSource::Stored));
    }

    #[tokio::test]
    async fn test_save_caches_written_schedule_when_reads_fail() {
        let store = Arc::new(MemorySettingsStore::new());
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 12, 0)));
        let engine = engine_with(Arc::clone(&store), clock);
        store.set_fail_reads(true);

        let closed = WeeklySchedule::uniform(DayHours::closed());
        let saved = engine.save_schedule(closed.clone()).await.unwrap();
        assert_eq!(*saved, closed);
        assert_eq!(engine.cached_source(), Some(ScheduleSource::Stored));
        assert_eq!(*engine.schedule().await, closed);
        assert_eq!(store.read_count(), 0);
    }

    #[tokio::test]
    async fn test_huge_order_grace_does_not_overflow() {
        let store = Arc::new(MemorySettingsStore::new());
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 11, 30)));
        let engine = BusinessHoursEngine::with_clock(
            store,
            clock,
            EngineOptions {
                order_grace: Duration::MAX,
                ..EngineOptions::default()
            },
        );

        // Thursday 12:30 in Rome, inside the default lunch period
        let result = engine
            .validate_order_time(Some(utc(2025, 3, 13, 11, 30)))
            .await;
        assert!(result.valid);
    }

    #[tokio::test]
    async fn test_save_validates_times() {
        let store = Arc::new(MemorySettingsStore::new());
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 12, 0)));
        let engine = engine_with(Arc::clone(&store), clock);

        let mut schedule = WeeklySchedule::default();
        schedule.friday.dinner = TimePeriod::open("18:00", "25:00");
        let err = engine.save_schedule(schedule).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTimeFormat);
        assert!(store.fetch_all(BUSINESS_HOURS_KEY).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_document_accepts_legacy_shape() {
        let store = Arc::new(MemorySettingsStore::new());
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 12, 0)));
        let engine = engine_with(Arc::clone(&store), clock);

        let legacy_day = json!({ "isOpen": true, "openTime": "12:00", "closeTime": "23:00" });
        let document = json!({
            "monday": legacy_day, "tuesday": legacy_day, "wednesday": legacy_day,
            "thursday": legacy_day, "friday": legacy_day, "saturday": legacy_day,
            "sunday": legacy_day,
        });
        let saved = engine.save_document(&document).await.unwrap();
        assert_eq!(saved.thursday.lunch, TimePeriod::open("12:00", "15:30"));
        assert_eq!(saved.thursday.dinner, TimePeriod::open("18:00", "23:00"));

        let row = store.fetch(BUSINESS_HOURS_KEY).await.unwrap().unwrap();
        assert!(WeeklySchedule::from_stored(&row.value).unwrap().is_canonical());
    }

    #[tokio::test]
    async fn test_save_document_rejects_partial_week() {
        let store = Arc::new(MemorySettingsStore::new());
        let clock = Arc::new(ManualClock::new(utc(2025, 3, 13, 12, 0)));
        let engine = engine_with(store, clock);

        let err = engine
            .save_document(&json!({ "monday": { "isOpen": false } }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ScheduleInvalid);
    }
}
