//! Simulated range sensor.
//!
//! The simulation is deliberately minimal: an externally settable boolean
//! stands in for the whole sensor.  No distance value is synthesized —
//! simulated distance is always reported as zero.  Subsystem logic keys
//! off the detection flag, so that is the only thing worth faking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::bus::RangeFrame;

// ---------------------------------------------------------------------------
// DetectFlag
// ---------------------------------------------------------------------------

/// Shared handle to a simulated detection state.
///
/// Cloned handles observe the same flag, so a test harness or sim scene
/// keeps one clone and the sensor holds another.
#[derive(Debug, Clone, Default)]
pub struct DetectFlag(Arc<AtomicBool>);

impl DetectFlag {
    /// New flag, initially clear.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the detection state.
    pub fn set(&self, detecting: bool) {
        self.0.store(detecting, Ordering::Relaxed);
    }

    /// Current detection state.
    #[must_use]
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// SimRange
// ---------------------------------------------------------------------------

/// Simulated backend: reads the flag, reports zero distance.
#[derive(Debug, Clone)]
pub struct SimRange {
    flag: DetectFlag,
}

impl SimRange {
    /// Simulated sensor backed by `flag`.
    #[must_use]
    pub const fn new(flag: DetectFlag) -> Self {
        Self { flag }
    }

    /// Produce a frame from the current flag state.
    #[must_use]
    pub fn sample(&self) -> RangeFrame {
        RangeFrame {
            distance_meters: 0.0,
            is_detecting: self.flag.get(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
