//! Monotonic time sources.
//!
//! All engine timestamps are plain millisecond readings from a [`Clock`].
//! Only differences between readings are meaningful; the origin is
//! arbitrary and never compared across processes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Milliseconds on a monotonic timeline.
pub type Millis = u64;

/// A source of monotonic millisecond readings.
pub trait Clock: Send + Sync {
    /// Current reading. Never decreases between calls.
    fn now_millis(&self) -> Millis;
}

/// Wall-independent clock backed by [`Instant`].
///
/// Readings are milliseconds elapsed since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose zero is the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a loop driver and the components it
/// drives can observe one timeline.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `start` milliseconds.
    pub fn new(start: Millis) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Move the clock forward by `delta` milliseconds.
    pub fn advance(&self, delta: Millis) -> Millis {
        self.now.fetch_add(delta, Ordering::SeqCst).saturating_add(delta)
    }

    /// Jump to `target`. Requests to move backwards are ignored.
    pub fn set(&self, target: Millis) -> Millis {
        let previous = self.now.fetch_max(target, Ordering::SeqCst);
        previous.max(target)
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}
