//! Time source for courtesy delays, retry backoff, and checkpoint timing
//!
//! All waiting in the harvester goes through a [`Clock`] so the walker and the
//! fetcher can be driven by a [`ManualClock`] in tests: sleeping on a manual
//! clock advances its time instantly instead of blocking.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A source of the current time that can also suspend the caller
#[async_trait]
pub trait Clock: Send + Sync {
    /// Returns the current instant
    fn now(&self) -> Instant;

    /// Suspends the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock time backed by tokio's timer
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// A clock that only moves when told to
///
/// `sleep` returns immediately after advancing the clock by the requested
/// duration, so a run with multi-second delays completes instantly while
/// still observing the same elapsed times.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

#[derive(Debug)]
struct ManualState {
    now: Instant,
    slept: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    /// Creates a manual clock starting at the current instant
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ManualState {
                now: Instant::now(),
                slept: Duration::ZERO,
                sleeps: Vec::new(),
            }),
        }
    }

    /// Moves the clock forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        let mut state = self.lock();
        state.now += duration;
    }

    /// Total time spent in `sleep` calls
    pub fn total_slept(&self) -> Duration {
        self.lock().slept
    }

    /// Every non-zero sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        // A poisoned lock only means a test thread panicked mid-update; the
        // state itself is still a valid instant.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.lock().now
    }

    async fn sleep(&self, duration: Duration) {
        let mut state = self.lock();
        state.now += duration;
        state.slept += duration;
        if !duration.is_zero() {
            state.sleeps.push(duration);
        }
    }
}
