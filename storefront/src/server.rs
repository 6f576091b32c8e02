//! HTTP server lifecycle
//!
//! Warms the schedule cache, starts the refresher, serves the router and
//! shuts everything down on Ctrl+C or SIGTERM.

use std::sync::Arc;

use crate::api;
use crate::core::{AppState, BackgroundTasks, BoxError, Config, TaskKind};
use crate::hours::ScheduleRefresher;

pub async fn run(config: Config) -> Result<(), BoxError> {
    let http_port = config.http_port;
    let refresh_interval = config.schedule_refresh_interval;

    let state = AppState::new(config).await?;

    let mut tasks = BackgroundTasks::new();

    let engine = Arc::clone(&state.engine);
    tasks.spawn("schedule_warmup", TaskKind::Warmup, async move {
        engine.refresh().await;
    });

    let refresher = ScheduleRefresher::new(
        Arc::clone(&state.engine),
        Arc::clone(&state.store),
        refresh_interval,
        tasks.shutdown_token(),
    );
    tasks.spawn("schedule_refresher", TaskKind::Listener, refresher.run());

    let app = api::create_router(state);
    let addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Storefront HTTP listening on {addr}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    tasks.check_health();
    tasks.shutdown().await;

    served?;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
