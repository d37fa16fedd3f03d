//! Control requests: the one active command on a motor driver.
//!
//! Values are mechanism-side physical units (volts, radians, rad/s).
//! Exactly one request is active per driver at a time; issuing a new one
//! supersedes the previous one before the next hardware write.  Follower
//! requests carry no physical value and bypass unit conversion entirely.

use unidrive_core::error::RequestError;

use crate::bus::DeviceId;

// ---------------------------------------------------------------------------
// ControlRequest
// ---------------------------------------------------------------------------

/// A control command for a motor driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlRequest {
    /// Open-loop output voltage (V).
    Voltage {
        /// Commanded output (V).
        volts: f32,
    },
    /// Closed-loop position setpoint, mechanism side.
    Position {
        /// Target angle (rad).
        radians: f32,
        /// Additive voltage feedforward (V).
        feedforward_volts: f32,
    },
    /// Closed-loop velocity setpoint, mechanism side.
    Velocity {
        /// Target angular velocity (rad/s).
        rad_per_sec: f32,
        /// Additive voltage feedforward (V).
        feedforward_volts: f32,
    },
    /// Mirror another driver's raw commanded output.
    Follow {
        /// Device id of the leader.
        leader: DeviceId,
        /// Oppose the leader's direction.
        invert: bool,
    },
}

impl Default for ControlRequest {
    /// Rest state: zero volts.
    fn default() -> Self {
        Self::Voltage { volts: 0.0 }
    }
}

impl ControlRequest {
    /// Open-loop voltage request.
    #[must_use]
    pub const fn voltage(volts: f32) -> Self {
        Self::Voltage { volts }
    }

    /// Position setpoint (rad), no feedforward.
    #[must_use]
    pub const fn position(radians: f32) -> Self {
        Self::Position {
            radians,
            feedforward_volts: 0.0,
        }
    }

    /// Velocity setpoint (rad/s), no feedforward.
    #[must_use]
    pub const fn velocity(rad_per_sec: f32) -> Self {
        Self::Velocity {
            rad_per_sec,
            feedforward_volts: 0.0,
        }
    }

    /// Follower request mirroring `leader`.
    #[must_use]
    pub const fn follow(leader: DeviceId, invert: bool) -> Self {
        Self::Follow { leader, invert }
    }

    /// Builder: set the voltage feedforward on a closed-loop request.
    ///
    /// No effect on voltage and follower requests.
    #[must_use]
    pub const fn with_feedforward(mut self, volts: f32) -> Self {
        match &mut self {
            Self::Position {
                feedforward_volts, ..
            }
            | Self::Velocity {
                feedforward_volts, ..
            } => *feedforward_volts = volts,
            Self::Voltage { .. } | Self::Follow { .. } => {}
        }
        self
    }

    /// Validate that the request is well-formed for the given device.
    ///
    /// Non-finite values and self-following are rejected; a rejected
    /// request must leave the driver's active request untouched.
    pub fn validate(&self, device: DeviceId) -> Result<(), RequestError> {
        match *self {
            Self::Voltage { volts } => {
                if !volts.is_finite() {
                    return Err(RequestError::NonFinite);
                }
            }
            Self::Position {
                radians: value,
                feedforward_volts,
            }
            | Self::Velocity {
                rad_per_sec: value,
                feedforward_volts,
            } => {
                if !value.is_finite() {
                    return Err(RequestError::NonFinite);
                }
                if !feedforward_volts.is_finite() {
                    return Err(RequestError::NonFiniteFeedforward);
                }
            }
            Self::Follow { leader, .. } => {
                if leader == device {
                    return Err(RequestError::SelfFollow(leader.0));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
