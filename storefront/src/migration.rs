//! Business-hours migration
//!
//! Rewrites the stored schedule into the canonical lunch/dinner shape.
//! Refuses to touch the store while duplicate rows exist. Running it again
//! over migrated data is a no-op.

use serde::Serialize;
use shared::error::{AppError, AppResult};
use shared::models::{BUSINESS_HOURS_KEY, WeeklySchedule, weekday_key};

use crate::db::SettingsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// Stored value already canonical
    Unchanged,
    /// Legacy or non-canonical value rewritten
    Migrated,
    /// No row existed; the default schedule was written
    Created,
    /// A write was needed but not performed
    DryRun,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub outcome: MigrationOutcome,
    pub legacy_days: Vec<&'static str>,
    /// Days that were missing or unreadable and are now closed
    pub invalid_days: Vec<&'static str>,
    pub schedule: WeeklySchedule,
}

pub async fn migrate_business_hours(
    store: &dyn SettingsStore,
    dry_run: bool,
) -> AppResult<MigrationReport> {
    let rows = store
        .fetch_all(BUSINESS_HOURS_KEY)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    if rows.len() > 1 {
        tracing::error!(count = rows.len(), "Duplicate business hours rows, refusing to migrate");
        return Err(AppError::duplicate_schedule_rows(BUSINESS_HOURS_KEY, rows.len()));
    }

    let mut report = match rows.first() {
        None => MigrationReport {
            outcome: MigrationOutcome::Created,
            legacy_days: Vec::new(),
            invalid_days: Vec::new(),
            schedule: WeeklySchedule::default(),
        },
        Some(row) => {
            let reconciled = WeeklySchedule::from_stored(&row.value)
                .map_err(|e| AppError::schedule_invalid(e.to_string()))?;
            let outcome = if reconciled.schedule.to_value() == row.value {
                MigrationOutcome::Unchanged
            } else {
                MigrationOutcome::Migrated
            };
            MigrationReport {
                outcome,
                legacy_days: reconciled.legacy_days.iter().map(|d| weekday_key(*d)).collect(),
                invalid_days: reconciled.invalid_days.iter().map(|d| weekday_key(*d)).collect(),
                schedule: reconciled.schedule,
            }
        }
    };

    if report.outcome == MigrationOutcome::Unchanged {
        tracing::info!("Business hours already in canonical shape");
        return Ok(report);
    }

    if dry_run {
        tracing::info!(would = ?report.outcome, "Dry run, nothing written");
        report.outcome = MigrationOutcome::DryRun;
        return Ok(report);
    }

    store
        .upsert(BUSINESS_HOURS_KEY, report.schedule.to_value())
        .await
        .map_err(|e| AppError::schedule_save_failed(e.to_string()))?;

    tracing::info!(
        outcome = ?report.outcome,
        legacy_days = ?report.legacy_days,
        invalid_days = ?report.invalid_days,
        "Business hours migrated"
    );
    Ok(report)
}
