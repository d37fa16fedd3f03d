//! Hardware bus seam for real motor controllers.
//!
//! [`MotorBus`] is the single point where the driver touches vendor
//! hardware.  Everything on this trait is rotor-native (rotations,
//! rotations/s) — unit conversion happens above it, in the driver.
//!
//! Implementations must not spawn background refresh threads; all reads
//! and writes happen on the control-cycle thread.

use serde::{Deserialize, Serialize};
use unidrive_core::error::BusError;

pub use unidrive_core::bus::DeviceId;

// ---------------------------------------------------------------------------
// MotorFrame
// ---------------------------------------------------------------------------

/// One raw status frame from a motor controller, rotor-native units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotorFrame {
    /// Rotor position (rotations).
    pub rotor_rotations: f32,
    /// Rotor velocity (rotations/s).
    pub rotor_rps: f32,
    /// Stator (torque-producing) current (A), signed.
    pub stator_current_amps: f32,
    /// Supply-side current draw (A).
    pub supply_current_amps: f32,
    /// Output voltage last applied by the controller (V).
    pub applied_volts: f32,
}

// ---------------------------------------------------------------------------
// MotorBus
// ---------------------------------------------------------------------------

/// Raw get/set primitives of a physical motor controller.
///
/// Every call is fallible; failures are treated as transient by the driver
/// (keep the last known value, warn, keep cycling).  Writes are
/// fire-and-forget from the control loop's perspective.
pub trait MotorBus: Send + Sync {
    /// Command an open-loop output voltage (V).
    fn write_voltage(&mut self, volts: f32) -> Result<(), BusError>;

    /// Command the onboard position loop (rotor rotations) with a voltage
    /// feedforward (V).
    fn write_position(&mut self, rotor_rotations: f32, feedforward_volts: f32)
        -> Result<(), BusError>;

    /// Command the onboard velocity loop (rotor rotations/s) with a voltage
    /// feedforward (V).
    fn write_velocity(&mut self, rotor_rps: f32, feedforward_volts: f32)
        -> Result<(), BusError>;

    /// Mirror another controller's output, optionally inverted.
    fn write_follow(&mut self, leader: DeviceId, invert: bool) -> Result<(), BusError>;

    /// Overwrite the controller's position reference without moving the
    /// rotor (re-zero against an absolute encoder or home switch).
    fn set_reference(&mut self, rotor_rotations: f32) -> Result<(), BusError>;

    /// Read a fresh status frame.
    fn read_frame(&mut self) -> Result<MotorFrame, BusError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
