//! Monotonic time sources for cycle-time measurement.
//!
//! Drivers and filters measure the real elapsed time between calls rather
//! than assuming the nominal control period, so they stay correct when the
//! scheduler jitters or a cycle is skipped.
//!
//! Nanoseconds are tracked as integers to avoid floating-point
//! accumulation errors over long runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// TimeSource
// ---------------------------------------------------------------------------

/// A monotonic clock readable as elapsed time since an arbitrary epoch.
///
/// Implementations must be non-decreasing.  The absolute epoch is
/// irrelevant; consumers only ever subtract two readings.
pub trait TimeSource: Send + Sync {
    /// Current reading of the clock.
    fn now(&self) -> Duration;
}

// ---------------------------------------------------------------------------
// MonotonicTime
// ---------------------------------------------------------------------------

/// Wall-clock time source backed by [`Instant`].
///
/// The epoch is the moment of construction.
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    epoch: Instant,
}

impl MonotonicTime {
    /// Create a new time source anchored at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

// ---------------------------------------------------------------------------
// StepTime
// ---------------------------------------------------------------------------

/// Manually advanced time source.
///
/// Clones share the same underlying clock, so a test (or a replay harness)
/// can keep one handle, hand another to a driver, and advance time
/// deterministically between cycles.
#[derive(Debug, Clone, Default)]
pub struct StepTime {
    nanos: Arc<AtomicU64>,
}

impl StepTime {
    /// Create a new clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `delta`.
    pub fn advance(&self, delta: Duration) {
        #[allow(clippy::cast_possible_truncation)]
        self.nanos
            .fetch_add(delta.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Advance the clock by `secs` seconds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn advance_secs(&self, secs: f64) {
        self.nanos
            .fetch_add((secs * 1_000_000_000.0) as u64, Ordering::Relaxed);
    }

    /// Raw nanosecond count.
    #[must_use]
    pub fn nanos(&self) -> u64 {
        self.nanos.load(Ordering::Relaxed)
    }
}

impl TimeSource for StepTime {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
