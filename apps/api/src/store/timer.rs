use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::warn;

/// Single-slot delayed task. Scheduling aborts whatever is still pending,
/// so at most one callback is ever live.
#[derive(Debug, Default)]
pub struct CancellableTimer {
    handle: Option<JoinHandle<()>>,
}

impl CancellableTimer {
    /// Runs `task` after `delay` unless cancelled or rescheduled first.
    /// Returns false when called outside a tokio runtime; nothing is scheduled then.
    pub fn schedule<F>(&mut self, delay: Duration, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime available, timer not scheduled");
            return false;
        };
        self.handle = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
        true
    }

    /// Aborts the pending callback. Returns true if one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CancellableTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut timer = CancellableTimer::default();
        let h = hits.clone();
        timer.schedule(Duration::from_millis(100), async move {
            h.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(99)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending_callback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut timer = CancellableTimer::default();
        for value in 1..=3 {
            let h = hits.clone();
            timer.schedule(Duration::from_millis(100), async move {
                h.store(value, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_callback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut timer = CancellableTimer::default();
        let h = hits.clone();
        timer.schedule(Duration::from_millis(100), async move {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert!(timer.cancel());

        tokio::time::sleep(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!timer.cancel());
    }

    #[test]
    fn test_schedule_without_runtime_is_noop() {
        let mut timer = CancellableTimer::default();
        assert!(!timer.schedule(Duration::from_millis(1), async {}));
        assert!(!timer.is_pending());
    }
}
