//! The unified range sensor.
//!
//! Same cycle contract as the motor driver: `update_inputs` once per
//! control cycle, reads between refreshes see an immutable snapshot, bus
//! transients degrade to stale data instead of stalling the cycle.

use serde::{Deserialize, Serialize};
use unidrive_core::bus::DeviceId;

use crate::backend::RangeBackend;
use crate::bus::{RangeBus, RangeFrame};
use crate::sim::SimRange;

// ---------------------------------------------------------------------------
// RangeInputs
// ---------------------------------------------------------------------------

/// Snapshot of sensor state, refreshed once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeInputs {
    /// Measured distance to the nearest object (m).  Always zero on the
    /// simulated backend.
    pub distance_meters: f32,
    /// Whether an object is within the detection threshold.
    pub is_detecting: bool,
}

// ---------------------------------------------------------------------------
// RangeSensor
// ---------------------------------------------------------------------------

/// Unified wrapper over one range sensor, real or simulated.
#[derive(Debug)]
pub struct RangeSensor {
    id: DeviceId,
    backend: RangeBackend,
    inputs: RangeInputs,
    bus_faults: u32,
}

impl RangeSensor {
    const fn with_backend(id: DeviceId, backend: RangeBackend) -> Self {
        Self {
            id,
            backend,
            inputs: RangeInputs {
                distance_meters: 0.0,
                is_detecting: false,
            },
            bus_faults: 0,
        }
    }

    /// Sensor over a physical device.
    pub fn real(id: DeviceId, bus: impl RangeBus + 'static) -> Self {
        Self::with_backend(id, RangeBackend::Real(Box::new(bus)))
    }

    /// Sensor over a simulated detection flag.
    pub const fn sim(id: DeviceId, sim: SimRange) -> Self {
        Self::with_backend(id, RangeBackend::Sim(sim))
    }

    /// Sensor whose inputs are fed by log playback.
    pub const fn replay(id: DeviceId) -> Self {
        Self::with_backend(id, RangeBackend::Replay)
    }

    /// Bus address of this sensor.
    #[must_use]
    pub const fn id(&self) -> DeviceId {
        self.id
    }

    /// Most recent snapshot.
    #[must_use]
    pub const fn inputs(&self) -> RangeInputs {
        self.inputs
    }

    /// Latest detection state.
    #[must_use]
    pub const fn is_in_range(&self) -> bool {
        self.inputs.is_detecting
    }

    /// Latest distance reading (m).
    #[must_use]
    pub const fn distance_meters(&self) -> f32 {
        self.inputs.distance_meters
    }

    /// Transient bus faults seen so far.
    #[must_use]
    pub const fn bus_faults(&self) -> u32 {
        self.bus_faults
    }

    /// Refresh the snapshot.  Call exactly once per control cycle.
    ///
    /// A real-bus read failure retains the previous snapshot rather than
    /// surfacing a fault.
    pub fn update_inputs(&mut self) {
        match self.backend.refresh() {
            Ok(Some(frame)) => self.inputs = Self::frame_to_inputs(frame),
            // Replay: the snapshot is owned by playback, keep it.
            Ok(None) => {}
            Err(err) => {
                self.bus_faults += 1;
                tracing::warn!(device = %self.id, error = %err, "range read failed, keeping stale inputs");
            }
        }
    }

    /// Overwrite the snapshot directly.  Replay playback seam.
    pub fn load_inputs(&mut self, inputs: RangeInputs) {
        self.inputs = inputs;
    }

    const fn frame_to_inputs(frame: RangeFrame) -> RangeInputs {
        RangeInputs {
            distance_meters: frame.distance_meters,
            is_detecting: frame.is_detecting,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
