//! Logging infrastructure
//!
//! Console output by default, JSON lines when requested, and a daily
//! rolling file when a log directory is configured.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when neither `LOG_LEVEL` nor `RUST_LOG` is set
pub const DEFAULT_FILTER: &str = "storefront=info,tower_http=info";

/// Build the level filter: explicit level first, then `RUST_LOG`
pub fn build_filter(log_level: Option<&str>) -> EnvFilter {
    match log_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Initialize the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
pub fn init_logger(log_level: Option<&str>, json: bool, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let filter = build_filter(log_level);

    let (writer, guard) = match log_dir.filter(|dir| Path::new(dir).is_dir()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "storefront");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(writer);

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()
    } else {
        tracing_subscriber::registry().with(filter).with(layer).try_init()
    };
    if result.is_err() {
        tracing::debug!("Global subscriber already installed");
    }

    if let Some(dir) = log_dir
        && guard.is_none()
    {
        tracing::warn!(dir = %dir, "Log directory does not exist, logging to stdout only");
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_falls_back_on_garbage() {
        let filter = build_filter(Some("storefront=notalevel")).to_string();
        assert!(filter.contains("storefront=info"));
        assert!(filter.contains("tower_http=info"));
    }

    #[test]
    fn test_explicit_level_wins() {
        assert!(build_filter(Some("debug")).to_string().contains("debug"));
    }
}
