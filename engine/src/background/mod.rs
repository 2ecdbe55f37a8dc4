//! Background task registry
//!
//! Owns the fire-and-forget work the pipeline spawns (the memory write path).
//! The registry is bounded: when it is full, spawning waits for the oldest
//! task to finish instead of growing without limit. `drain` is the explicit
//! join point used for orderly shutdown and for deterministic tests: tests
//! await completion instead of racing a timer.

use std::future::Future;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::warn;

/// Bounded registry of detached background tasks.
pub struct BackgroundTasks {
    tasks: Mutex<JoinSet<()>>,
    capacity: usize,
}

impl BackgroundTasks {
    /// Create a registry holding at most `capacity` in-flight tasks.
    pub fn new(capacity: usize) -> Self {
        Self {
            tasks: Mutex::new(JoinSet::new()),
            capacity: capacity.max(1),
        }
    }

    /// Spawn a task without awaiting its result.
    ///
    /// Waits for older tasks when the registry is at capacity; a panicked
    /// task is logged and dropped, never propagated.
    pub async fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        while tasks.len() >= self.capacity {
            if let Some(Err(e)) = tasks.join_next().await {
                warn!(error = %e, "Background task failed");
            }
        }
        tasks.spawn(future);
    }

    /// Await every in-flight task. Panics inside tasks are logged, not
    /// propagated.
    pub async fn drain(&self) {
        let mut tasks = self.tasks.lock().await;
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Background task failed");
            }
        }
    }

    /// Number of tasks currently registered
    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Whether no tasks are registered
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn drain_joins_all_spawned_tasks() {
        let registry = BackgroundTasks::new(8);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            registry
                .spawn(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }

        registry.drain().await;
        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn panicking_task_is_swallowed() {
        let registry = BackgroundTasks::new(4);
        registry.spawn(async { panic!("background boom") }).await;
        registry.drain().await;
        // Reaching this point is the assertion: drain survived the panic.
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn capacity_is_enforced_by_joining_older_tasks() {
        let registry = BackgroundTasks::new(2);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..6 {
            let counter = Arc::clone(&counter);
            registry
                .spawn(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .await;
            assert!(registry.len().await <= 2);
        }

        registry.drain().await;
        assert_eq!(counter.load(Ordering::SeqCst), 6);
    }
}
