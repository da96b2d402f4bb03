//! Bookkeeping for fire-and-forget work.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// Spawns detached tasks and counts the ones still running.
///
/// Nothing on the request path awaits these tasks. The count lets a process
/// that is about to exit give them a grace period, and lets tests observe that
/// work was scheduled without waiting for it.
#[derive(Clone)]
pub struct DetachedTasks {
    in_flight: Arc<watch::Sender<usize>>,
}

impl Default for DetachedTasks {
    fn default() -> Self {
        Self::new()
    }
}

impl DetachedTasks {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            in_flight: Arc::new(tx),
        }
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.in_flight.send_modify(|n| *n += 1);
        let guard = InFlight(self.in_flight.clone());

        tokio::spawn(async move {
            let _guard = guard;
            task.await;
        });
    }

    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Wait until no task is running, or `grace` elapses. Returns whether
    /// everything finished.
    pub async fn drain(&self, grace: Duration) -> bool {
        let mut rx = self.in_flight.subscribe();
        let finished = tokio::time::timeout(grace, async move {
            rx.wait_for(|n| *n == 0).await.is_ok()
        })
        .await;

        matches!(finished, Ok(true))
    }
}

/// Decrements the counter even if the task panics.
struct InFlight(Arc<watch::Sender<usize>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}
