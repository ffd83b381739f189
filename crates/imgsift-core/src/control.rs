//! Cooperative stop for a collection run.
//!
//! A `StopSignal` is shared between the collection loop (which checks it between
//! attempts and sleeps on it between attempts) and whoever can interrupt the run
//! (the CLI's Ctrl-C listener, or a curl progress callback polling it mid-transfer).

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Error used when a transfer was cut short because a stop was requested.
#[derive(Debug)]
pub struct Interrupted;

impl std::fmt::Display for Interrupted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "interrupted by user")
    }
}

impl std::error::Error for Interrupted {}

/// Shared stop flag with an interruptible wait. Wrap in `Arc` to share.
#[derive(Default)]
pub struct StopSignal {
    stopped: Mutex<bool>,
    cv: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        // Poisoning is harmless for a plain bool.
        self.stopped.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Request a stop and wake any waiter.
    pub fn request_stop(&self) {
        *self.lock() = true;
        self.cv.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.lock()
    }

    /// Sleep for up to `delay`, returning early if a stop is requested.
    /// Returns true if the run should stop.
    pub fn wait(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        let mut stopped = self.lock();
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            stopped = self
                .cv
                .wait_timeout(stopped, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
        true
    }
}
