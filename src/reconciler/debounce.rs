//! # Trailing-edge debouncer for an async operation.
//!
//! [`Debounce`] wraps one owned async operation and coalesces bursts of
//! `call()`s into a single trailing execution per window. It is the
//! backpressure mechanism for reconciliation passes and board rewrites:
//! a reaction-event storm produces one platform write burst, not one per
//! event.
//!
//! ## Rules
//! - `call()` is fire-and-forget and returns immediately.
//! - Calls landing while a run is **scheduled** are absorbed by that run.
//! - Calls landing while the operation is **executing** set a rerun flag;
//!   exactly one follow-up run happens after the current one. A write that
//!   arrives mid-flight is therefore never dropped.
//! - `settle()` waits until no run is scheduled or executing (tests).

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::Notify;
use tokio::time;

/// Scheduling state: one pending-timer flag, one rerun flag.
#[derive(Default)]
struct DebounceState {
    scheduled: bool,
    rerun: bool,
}

struct DebounceInner {
    window: Duration,
    op: Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>,
    state: Mutex<DebounceState>,
    idle: Notify,
}

/// Timer-coalescing wrapper around an async operation.
#[derive(Clone)]
pub struct Debounce {
    inner: Arc<DebounceInner>,
}

impl Debounce {
    /// Wraps `op`. Each execution is a fresh future produced by the closure.
    pub fn new<F, Fut>(window: Duration, op: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        Self {
            inner: Arc::new(DebounceInner {
                window,
                op: Arc::new(move || Box::pin(op())),
                state: Mutex::new(DebounceState::default()),
                idle: Notify::new(),
            }),
        }
    }

    /// Requests one execution within the debounce window.
    ///
    /// Collapses with other requests in the same window; never blocks.
    pub fn call(&self) {
        {
            let mut state = self.lock_state();
            if state.scheduled {
                state.rerun = true;
                return;
            }
            state.scheduled = true;
        }

        // Worker holds only a weak handle so a dropped Debounce does not
        // keep running its operation forever.
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            Self::worker(weak).await;
        });
    }

    /// Resolves once no run is scheduled or executing.
    pub async fn settle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if !self.lock_state().scheduled {
                return;
            }
            notified.await;
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DebounceState> {
        match self.inner.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn worker(weak: Weak<DebounceInner>) {
        loop {
            let Some(inner) = weak.upgrade() else { return };
            let window = inner.window;
            drop(inner);

            time::sleep(window).await;

            let Some(inner) = weak.upgrade() else { return };

            // Calls that arrived during the sleep are covered by this run.
            if let Ok(mut state) = inner.state.lock() {
                state.rerun = false;
            }

            (inner.op)().await;

            let again = {
                let mut state = match inner.state.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                if state.rerun {
                    state.rerun = false;
                    true
                } else {
                    state.scheduled = false;
                    false
                }
            };

            if !again {
                inner.idle.notify_waiters();
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(window: Duration) -> (Debounce, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let debounce = Debounce::new(window, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (debounce, runs)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_one_trailing_run() {
        let (debounce, runs) = counting(Duration::from_millis(300));

        for _ in 0..10 {
            debounce.call();
        }
        debounce.settle().await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_during_run_schedules_one_rerun() {
        let runs = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let counter = Arc::clone(&runs);
        let wait_on = Arc::clone(&gate);
        let debounce = Debounce::new(Duration::from_millis(10), move || {
            let counter = Arc::clone(&counter);
            let wait_on = Arc::clone(&wait_on);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    // First run parks until the test has issued the
                    // mid-flight call.
                    wait_on.notified().await;
                }
            }
        });

        debounce.call();
        tokio::time::sleep(Duration::from_millis(15)).await; // first run is now executing
        debounce.call(); // mid-flight
        debounce.call(); // coalesces with the rerun
        gate.notify_waiters();
        debounce.settle().await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_run_separately() {
        let (debounce, runs) = counting(Duration::from_millis(50));

        debounce.call();
        debounce.settle().await;
        debounce.call();
        debounce.settle().await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
