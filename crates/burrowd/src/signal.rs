//! One-shot, cloneable stop latch shared between threads.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Latch that, once triggered, stays triggered and releases every waiter.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    /// Builds an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers the signal and wakes all waiters. Further calls are no-ops.
    pub fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        let mut triggered = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *triggered = true;
        cvar.notify_all();
    }

    /// Returns `true` once [`StopSignal::trigger`] has been called.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the signal is triggered.
    pub fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let mut triggered = lock.lock().unwrap_or_else(PoisonError::into_inner);
        while !*triggered {
            triggered = cvar
                .wait(triggered)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Blocks until the signal is triggered or `timeout` elapses.
    ///
    /// Returns `true` when the signal was triggered.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let (lock, cvar) = &*self.inner;
        let mut triggered = lock.lock().unwrap_or_else(PoisonError::into_inner);
        while !*triggered {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            let (guard, _) = cvar
                .wait_timeout(triggered, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            triggered = guard;
        }
        true
    }
}
