//! migrate-business-hours [--dry-run]
//!
//! One-shot normalization of the stored schedule into the canonical
//! lunch/dinner shape. Requires `DATABASE_URL`.

use storefront::db::PgSettingsStore;
use storefront::migration::{MigrationOutcome, migrate_business_hours};
use storefront::{BoxError, init_logger};

const USAGE: &str = "usage: migrate-business-hours [--dry-run]";

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();
    let _log_guard = init_logger(std::env::var("LOG_LEVEL").ok().as_deref(), false, None);

    let mut dry_run = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--dry-run" | "-n" => dry_run = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            other => return Err(format!("unknown argument '{other}'\n{USAGE}").into()),
        }
    }

    let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let store = PgSettingsStore::connect(&database_url, 1).await?;
    store.run_migrations().await?;

    let report = migrate_business_hours(&store, dry_run).await?;
    match report.outcome {
        MigrationOutcome::Unchanged => println!("business hours already canonical, nothing to do"),
        MigrationOutcome::Migrated => println!("business hours migrated to lunch/dinner shape"),
        MigrationOutcome::Created => println!("no business hours stored, default schedule written"),
        MigrationOutcome::DryRun => println!("dry run: business hours would be rewritten"),
    }
    if !report.legacy_days.is_empty() {
        println!("legacy days: {}", report.legacy_days.join(", "));
    }
    if !report.invalid_days.is_empty() {
        println!("unreadable days now closed: {}", report.invalid_days.join(", "));
    }
    println!("{}", serde_json::to_string_pretty(&report.schedule)?);

    Ok(())
}
