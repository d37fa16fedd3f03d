//! Backend dispatch: real hardware, simulated physics, or replay.
//!
//! The variant is chosen once at driver construction and never
//! re-evaluated; no call site branches on run mode after that.  Static
//! dispatch over the known variants — no vtable on the hot path (the bus
//! inside `Real` is the only trait object).

use unidrive_core::error::BusError;

use crate::bus::{DeviceId, MotorBus, MotorFrame};
use crate::sim::SimMotor;

// ---------------------------------------------------------------------------
// NativeRequest
// ---------------------------------------------------------------------------

/// A control request after unit conversion, in rotor-native units.
///
/// This is what actually crosses the backend boundary; mechanism-side
/// units never reach hardware.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeRequest {
    /// Open-loop output voltage (V).
    Voltage { volts: f32 },
    /// Onboard position loop target (rotor rotations).
    Position {
        rotor_rotations: f32,
        feedforward_volts: f32,
    },
    /// Onboard velocity loop target (rotor rotations/s).
    Velocity {
        rotor_rps: f32,
        feedforward_volts: f32,
    },
    /// Mirror another controller's output.
    Follow { leader: DeviceId, invert: bool },
}

impl Default for NativeRequest {
    fn default() -> Self {
        Self::Voltage { volts: 0.0 }
    }
}

// ---------------------------------------------------------------------------
// MotorBackend
// ---------------------------------------------------------------------------

/// Where a driver's commands go and where its readings come from.
pub enum MotorBackend {
    /// Physical controller on the bus.
    Real(Box<dyn MotorBus>),
    /// Internal physics model.
    Sim(SimMotor),
    /// No hardware: writes are dropped, readings come from log playback.
    Replay,
}

impl MotorBackend {
    /// Forward a rotor-native request.
    ///
    /// Sim and Replay cannot fail; a Real bus error is transient and the
    /// caller keeps cycling.
    pub fn apply(&mut self, request: NativeRequest) -> Result<(), BusError> {
        match self {
            Self::Real(bus) => match request {
                NativeRequest::Voltage { volts } => bus.write_voltage(volts),
                NativeRequest::Position {
                    rotor_rotations,
                    feedforward_volts,
                } => bus.write_position(rotor_rotations, feedforward_volts),
                NativeRequest::Velocity {
                    rotor_rps,
                    feedforward_volts,
                } => bus.write_velocity(rotor_rps, feedforward_volts),
                NativeRequest::Follow { leader, invert } => bus.write_follow(leader, invert),
            },
            Self::Sim(motor) => {
                motor.set_request(request);
                Ok(())
            }
            Self::Replay => Ok(()),
        }
    }

    /// Produce a fresh frame, or `None` when this backend does not own the
    /// snapshot (Replay: playback writes it from the log).
    ///
    /// `dt` is the measured elapsed time since the previous refresh; only
    /// the simulated variant integrates with it.
    pub fn refresh(&mut self, dt: f32) -> Result<Option<MotorFrame>, BusError> {
        match self {
            Self::Real(bus) => bus.read_frame().map(Some),
            Self::Sim(motor) => Ok(Some(motor.step(dt))),
            Self::Replay => Ok(None),
        }
    }

    /// Overwrite the position reference (rotor rotations) without motion.
    ///
    /// Replay has no reference to overwrite and ignores this silently.
    pub fn set_reference(&mut self, rotor_rotations: f32) -> Result<(), BusError> {
        match self {
            Self::Real(bus) => bus.set_reference(rotor_rotations),
            Self::Sim(motor) => {
                motor.set_reference(rotor_rotations);
                Ok(())
            }
            Self::Replay => Ok(()),
        }
    }
}

impl std::fmt::Debug for MotorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(_) => f.write_str("MotorBackend::Real"),
            Self::Sim(motor) => f.debug_tuple("MotorBackend::Sim").field(motor).finish(),
            Self::Replay => f.write_str("MotorBackend::Replay"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
