//! Background schedule refresher
//!
//! Forces an engine refresh whenever the settings feed reports a change to
//! the business-hours row, and unconditionally on a fixed interval. The
//! feed is best-effort: when it cannot be opened or drops, the interval
//! alone keeps the cache current and resubscription is retried on each
//! tick.

use std::sync::Arc;
use std::time::Duration;

use shared::models::BUSINESS_HOURS_KEY;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::engine::BusinessHoursEngine;
use crate::db::{ChangeSubscription, SettingChange, SettingsStore};

enum Event {
    Change(Option<SettingChange>),
    Tick,
    Shutdown,
}

pub struct ScheduleRefresher {
    engine: Arc<BusinessHoursEngine>,
    store: Arc<dyn SettingsStore>,
    interval: Duration,
    shutdown: CancellationToken,
    feed: Option<ChangeSubscription>,
}

impl ScheduleRefresher {
    pub fn new(
        engine: Arc<BusinessHoursEngine>,
        store: Arc<dyn SettingsStore>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            engine,
            store,
            interval,
            shutdown,
            feed: None,
        }
    }

    /// Open the change feed now instead of when `run` starts
    pub async fn with_feed(mut self) -> Self {
        self.feed = self.subscribe().await;
        self
    }

    pub fn has_feed(&self) -> bool {
        self.feed.is_some()
    }

    async fn subscribe(&self) -> Option<ChangeSubscription> {
        match self.store.subscribe().await {
            Ok(feed) => Some(feed),
            Err(e) => {
                tracing::warn!(error = %e, "Settings change feed unavailable, relying on periodic refresh");
                None
            }
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Business hours refresher started"
        );

        if self.feed.is_none() {
            self.feed = self.subscribe().await;
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; the engine is already warm
        ticker.tick().await;

        loop {
            let event = tokio::select! {
                change = next_change(&mut self.feed) => Event::Change(change),
                _ = ticker.tick() => Event::Tick,
                _ = self.shutdown.cancelled() => Event::Shutdown,
            };

            match event {
                Event::Change(Some(change)) if change.key == BUSINESS_HOURS_KEY => {
                    tracing::info!("Business hours changed, refreshing");
                    self.engine.refresh().await;
                }
                Event::Change(Some(_)) => {}
                Event::Change(None) => {
                    tracing::warn!("Settings change feed closed, relying on periodic refresh");
                    self.feed = None;
                }
                Event::Tick => {
                    tracing::debug!("Periodic business hours refresh");
                    self.engine.refresh().await;
                    if self.feed.is_none() {
                        self.feed = self.subscribe().await;
                    }
                }
                Event::Shutdown => {
                    tracing::info!("Business hours refresher received shutdown signal");
                    return;
                }
            }
        }
    }
}

/// Next change from the feed; pends forever without one
async fn next_change(feed: &mut Option<ChangeSubscription>) -> Option<SettingChange> {
    match feed {
        Some(feed) => feed.recv().await,
        None => std::future::pending().await,
    }
}
