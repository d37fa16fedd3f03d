//! Mechanism/rotor unit conversion.
//!
//! # Unit Convention
//!
//! Mechanism side: radians and rad/s on the output shaft (the physical
//! quantity subsystem code reasons about).  Rotor side: rotations and
//! rotations/s as the motor controller natively counts them, before gear
//! reduction.
//!
//! # Gear Ratio Convention
//!
//! `gear_ratio = rotor turns / mechanism turn`:
//! - `gear_ratio > 1` means speed reduction / torque multiplication.
//! - Rotor rotations = mechanism rotations × `gear_ratio`.
//!
//! Every conversion and its inverse compose to identity within
//! floating-point tolerance.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Radians per rotation.
pub const RADS_PER_ROTATION: f32 = TAU;

/// Convert an angle in radians to rotations.
#[must_use]
pub fn radians_to_rotations(radians: f32) -> f32 {
    radians / TAU
}

/// Convert an angle in rotations to radians.
#[must_use]
pub fn rotations_to_radians(rotations: f32) -> f32 {
    rotations * TAU
}

/// Convert degrees to radians.
#[must_use]
pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees.to_radians()
}

// ---------------------------------------------------------------------------
// GearRatio
// ---------------------------------------------------------------------------

/// Validated gear ratio between a motor rotor and its mechanism.
///
/// Construction rejects non-finite and non-positive ratios; a driver with
/// an unusable reduction must not exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct GearRatio(f32);

impl GearRatio {
    /// Direct drive (1:1).
    pub const DIRECT: Self = Self(1.0);

    /// Create a validated gear ratio (rotor turns per mechanism turn).
    pub fn new(ratio: f32) -> Result<Self, ConfigError> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ConfigError::InvalidGearRatio(ratio));
        }
        Ok(Self(ratio))
    }

    /// Raw ratio value.
    #[must_use]
    pub const fn ratio(&self) -> f32 {
        self.0
    }

    /// Mechanism angle (rad) → rotor angle (rotations).
    #[must_use]
    pub fn mechanism_to_rotor(&self, mechanism_rads: f32) -> f32 {
        mechanism_rads * self.0 / TAU
    }

    /// Rotor angle (rotations) → mechanism angle (rad).
    #[must_use]
    pub fn rotor_to_mechanism(&self, rotor_rotations: f32) -> f32 {
        rotor_rotations * TAU / self.0
    }

    /// Mechanism velocity (rad/s) → rotor velocity (rotations/s).
    #[must_use]
    pub fn mechanism_to_rotor_velocity(&self, mechanism_rad_per_sec: f32) -> f32 {
        self.mechanism_to_rotor(mechanism_rad_per_sec)
    }

    /// Rotor velocity (rotations/s) → mechanism velocity (rad/s).
    #[must_use]
    pub fn rotor_to_mechanism_velocity(&self, rotor_rps: f32) -> f32 {
        self.rotor_to_mechanism(rotor_rps)
    }
}

impl Default for GearRatio {
    fn default() -> Self {
        Self::DIRECT
    }
}

impl TryFrom<f32> for GearRatio {
    type Error = ConfigError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GearRatio> for f32 {
    fn from(ratio: GearRatio) -> Self {
        ratio.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
