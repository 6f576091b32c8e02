//! Background work of the storefront process
//!
//! The schedule warmup runs once at startup. The schedule refresher lives
//! until shutdown; it stopping early means cache invalidation has stopped.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Expected to finish
    Warmup,
    /// Expected to run until the shutdown token fires
    Listener,
}

struct RegisteredTask {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// Spawned tasks plus the token that stops them
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Spawn `future`, logging a panic or an early exit of a listener
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(()) if kind == TaskKind::Listener => {
                    tracing::warn!(task = name, "Listener task returned");
                }
                Ok(()) => tracing::debug!(task = name, "Warmup task finished"),
                Err(payload) => {
                    tracing::error!(
                        task = name,
                        kind = ?kind,
                        panic = %panic_message(payload.as_ref()),
                        "Background task panicked"
                    );
                }
            }
        });
        self.tasks.push(RegisteredTask { name, kind, handle });
    }

    /// Number of listeners that are no longer running
    pub fn check_health(&self) -> usize {
        let stopped: Vec<&str> = self
            .tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Listener && t.handle.is_finished())
            .map(|t| t.name)
            .collect();
        if !stopped.is_empty() {
            tracing::error!(tasks = ?stopped, "Listener tasks stopped before shutdown");
        }
        stopped.len()
    }

    /// Fire the shutdown token and wait for every task
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let count = self.tasks.len();

        for task in self.tasks {
            if let Err(e) = task.handle.await {
                tracing::error!(task = task.name, error = %e, "Background task join failed");
            }
        }
        tracing::info!(count, "Background tasks stopped");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_stops_refresher_like_listener() {
        let mut tasks = BackgroundTasks::new();
        let token = tasks.shutdown_token();
        tasks.spawn("refresher", TaskKind::Listener, async move {
            token.cancelled().await;
        });
        tasks.spawn("warmup", TaskKind::Warmup, async {});

        tokio::time::sleep(Duration::from_millis(20)).await;
        // A finished warmup is healthy
        assert_eq!(tasks.check_health(), 0);

        tokio::time::timeout(Duration::from_secs(1), tasks.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_panicking_listener_reported_unhealthy() {
        let mut tasks = BackgroundTasks::new();
        tasks.spawn("refresher", TaskKind::Listener, async {
            panic!("listener failed");
        });

        for _ in 0..100 {
            if tasks.check_health() == 1 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("panicked task never reported");
    }

    #[test]
    fn test_panic_message_from_payload() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
