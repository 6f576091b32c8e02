use storefront::{BoxError, Config, init_logger, server};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    let _log_guard = init_logger(
        config.log_level.as_deref(),
        config.log_json,
        config.log_dir.as_deref(),
    );

    tracing::info!(
        env = %config.environment,
        timezone = %config.timezone,
        "Starting storefront"
    );

    if let Err(e) = server::run(config).await {
        tracing::error!("Server error: {e}");
        return Err(e);
    }
    Ok(())
}
