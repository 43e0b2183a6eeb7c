//! Best-effort release of external resources during shutdown.

use futures::future::BoxFuture;
use std::fmt::Display;
use std::future::Future;
use tracing::{info, warn};

type CleanupTask = BoxFuture<'static, Result<(), String>>;

/// Runs named cleanup tasks after the server has stopped accepting requests.
///
/// Every task runs even if an earlier one fails or panics. Failures are logged at
/// warn level and counted, never propagated, so a broken cleanup step cannot turn a
/// clean shutdown into a crash.
///
/// # Example
/// ```ignore
/// let mut cleanup = CleanupCoordinator::new();
/// cleanup.add_task("mongodb", database::mongodb::close(client));
/// cleanup.add_task("local-mongodb", local.stop());
/// let failures = cleanup.run().await;
/// ```
#[derive(Default)]
pub struct CleanupCoordinator {
    tasks: Vec<(&'static str, CleanupTask)>,
}

impl CleanupCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task. Nothing runs until [`run`](Self::run).
    pub fn add_task<F, E>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display,
    {
        self.tasks.push((
            name,
            Box::pin(async move { task.await.map_err(|e| e.to_string()) }),
        ));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task in registration order. Returns the number of failed tasks.
    pub async fn run(self) -> usize {
        info!("Running {} cleanup tasks", self.tasks.len());
        let mut failures = 0;

        for (name, task) in self.tasks {
            match tokio::spawn(task).await {
                Ok(Ok(())) => info!("Cleanup task '{}' completed successfully", name),
                Ok(Err(e)) => {
                    failures += 1;
                    warn!("Cleanup task '{}' failed: {}", name, e);
                }
                Err(e) => {
                    failures += 1;
                    warn!("Cleanup task '{}' panicked: {}", name, e);
                }
            }
        }

        info!("All cleanup tasks completed");
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_run_with_no_tasks() {
        let cleanup = CleanupCoordinator::new();
        assert!(cleanup.is_empty());
        assert_eq!(cleanup.run().await, 0);
    }

    #[tokio::test]
    async fn test_failures_are_counted_and_do_not_stop_later_tasks() {
        let closed = Arc::new(AtomicBool::new(false));
        let flag = closed.clone();

        let mut cleanup = CleanupCoordinator::new();
        cleanup.add_task("mongodb", async { Err::<(), _>("server selection timeout") });
        cleanup.add_task("local-mongodb", async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<(), String>(())
        });
        assert_eq!(cleanup.len(), 2);

        assert_eq!(cleanup.run().await, 1);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panicking_task_is_counted_as_failure() {
        let mut cleanup = CleanupCoordinator::new();
        let explode = true;
        cleanup.add_task("explodes", async move {
            if explode {
                panic!("cleanup blew up");
            }
            Ok::<(), String>(())
        });
        cleanup.add_task("fine", async { Ok::<(), String>(()) });

        assert_eq!(cleanup.run().await, 1);
    }

    #[tokio::test]
    async fn test_tasks_do_not_start_before_run() {
        let started = Arc::new(AtomicBool::new(false));
        let flag = started.clone();

        let mut cleanup = CleanupCoordinator::new();
        cleanup.add_task("lazy", async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<(), String>(())
        });

        tokio::task::yield_now().await;
        assert!(!started.load(Ordering::SeqCst));

        cleanup.run().await;
        assert!(started.load(Ordering::SeqCst));
    }
}
