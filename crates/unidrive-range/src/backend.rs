//! Backend dispatch: real hardware, simulated flag, or replay.
//!
//! Mirrors the motor driver's backend shape: the variant is chosen once
//! at sensor construction and no call site branches on run mode after
//! that.

use unidrive_core::error::BusError;

use crate::bus::{RangeBus, RangeFrame};
use crate::sim::SimRange;

/// Where a sensor's readings come from.
pub enum RangeBackend {
    /// Physical sensor on the bus.
    Real(Box<dyn RangeBus>),
    /// Externally settable detection flag, zero distance.
    Sim(SimRange),
    /// No hardware: readings come from log playback.
    Replay,
}

impl RangeBackend {
    /// Produce a fresh frame, or `None` when this backend does not own
    /// the snapshot (Replay: playback writes it from the log).
    pub fn refresh(&mut self) -> Result<Option<RangeFrame>, BusError> {
        match self {
            Self::Real(bus) => bus.read_frame().map(Some),
            Self::Sim(sim) => Ok(Some(sim.sample())),
            Self::Replay => Ok(None),
        }
    }
}

impl std::fmt::Debug for RangeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(_) => f.write_str("RangeBackend::Real"),
            Self::Sim(sim) => f.debug_tuple("RangeBackend::Sim").field(sim).finish(),
            Self::Replay => f.write_str("RangeBackend::Replay"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
