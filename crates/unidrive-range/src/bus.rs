//! Hardware bus seam for real time-of-flight sensors.

use serde::{Deserialize, Serialize};
use unidrive_core::error::BusError;

/// One raw reading from a physical range sensor.
///
/// The detection flag is the sensor's own threshold comparison, evaluated
/// onboard; the host never re-derives it from the distance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeFrame {
    /// Measured distance to the nearest object (m).
    pub distance_meters: f32,
    /// Onboard threshold comparison result.
    pub is_detecting: bool,
}

/// Raw read primitive of a physical range sensor.
///
/// Failures are treated as transient by the sensor wrapper (keep the last
/// known reading, warn, keep cycling).
pub trait RangeBus: Send + Sync {
    /// Read a fresh frame.
    fn read_frame(&mut self) -> Result<RangeFrame, BusError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
