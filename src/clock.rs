//! Clock Module
//!
//! Time-source abstraction so expiry math never reads the platform clock inline.
//! Stores take an `Arc<dyn Clock>`; production code uses [`SystemClock`] and
//! tests drive a [`ManualClock`] deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

// == Clock Trait ==
/// A source of "now" in milliseconds.
pub trait Clock: Send + Sync {
    /// Returns the current time in milliseconds.
    ///
    /// The origin is unspecified; only differences between readings matter.
    fn now_ms(&self) -> u64;
}

// == System Clock ==
/// Wall-clock time source backed by [`SystemTime`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

// == Manual Clock ==
/// A clock that only moves when told to.
///
/// Cloning shares the underlying counter, so a store and a test can hold
/// the same clock and the test can advance it between assertions.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a manual clock starting at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manual clock starting at the given millisecond reading.
    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(now_ms)),
        }
    }

    /// Advances the clock by `delta_ms` milliseconds.
    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
