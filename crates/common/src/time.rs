//! Time abstraction for testability
//!
//! Cache expiry is measured against a [`Clock`] rather than
//! [`Instant::now`] directly so token lifetimes can be tested without
//! sleeping.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use datasync_common::time::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let start = clock.now();
//! assert!(clock.now().duration_since(start) < Duration::from_secs(5));
//! ```

use std::fmt;
#[cfg(any(test, feature = "test-utils"))]
use std::sync::{Arc, Mutex, PoisonError};
#[cfg(any(test, feature = "test-utils"))]
use std::time::Duration;
use std::time::Instant;

/// Source of monotonic time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current monotonic instant.
    fn now(&self) -> Instant;
}

/// Real system clock. Use this in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Available with the `test-utils` feature.
///
/// Clones share the same elapsed time, so a test can keep one handle and give
/// another to the code under test.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockClock {
    /// Create a clock frozen at the current real instant.
    #[must_use]
    pub fn new() -> Self {
        Self { start: Instant::now(), elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Simulate `duration` passing.
    pub fn advance(&self, duration: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(PoisonError::into_inner);
        *elapsed += duration;
    }

    /// Set the absolute simulated elapsed time.
    pub fn set_elapsed(&self, duration: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(PoisonError::into_inner);
        *elapsed = duration;
    }

    /// Total simulated time since creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }
}
