//! Background task runner
//!
//! Fire-and-forget execution for one-shot jobs (scenario crafting). Tasks go
//! through a bounded queue; a dispatcher loop spawns each one wrapped in
//! `catch_unwind`, so a panicking job is logged and neither crashes the
//! process nor blocks queued work. No cancellation, no timeouts.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use types::errors::{GameError, GameResult};

/// Bounded fire-and-forget task queue
#[derive(Clone)]
pub struct TaskRunner {
    queue: mpsc::Sender<BoxFuture<'static, ()>>,
}

impl TaskRunner {
    /// Start the dispatcher; must be called inside a tokio runtime
    pub fn new(buffer: usize) -> Self {
        let (queue, mut pending) = mpsc::channel::<BoxFuture<'static, ()>>(buffer);

        tokio::spawn(async move {
            while let Some(task) = pending.recv().await {
                tokio::spawn(async move {
                    if let Err(panic) = AssertUnwindSafe(task).catch_unwind().await {
                        tracing::error!(?panic, "background task panicked");
                    }
                });
            }
        });

        Self { queue }
    }

    /// Enqueue a task; waits for queue capacity, fails only if the
    /// dispatcher is gone
    pub async fn dispatch<F>(&self, task: F) -> GameResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.queue
            .send(task.boxed())
            .await
            .map_err(|_| GameError::Internal("task runner is not running".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_tasks_run() {
        let runner = TaskRunner::new(8);
        let counter = Arc::new(AtomicU32::new(0));

        for _ in 0..4 {
            let counter = Arc::clone(&counter);
            runner
                .dispatch(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .await
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_panicking_task_does_not_block_queue() {
        let runner = TaskRunner::new(8);
        let counter = Arc::new(AtomicU32::new(0));

        runner
            .dispatch(async {
                panic!("boom");
            })
            .await
            .unwrap();

        let after = Arc::clone(&counter);
        runner
            .dispatch(async move {
                after.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
