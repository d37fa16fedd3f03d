//! Electrical constants for common competition-class brushless motors.
//!
//! Values are derived from published stall/free-speed figures at 12 V:
//! `R = V / I_stall`, `kt = T_stall / I_stall`.

use crate::sim::MotorSpec;

/// Common motor configurations.
pub mod motors {
    use super::MotorSpec;

    /// Kraken X60 class (7.09 Nm stall at 366 A).
    pub const fn kraken_x60() -> MotorSpec {
        MotorSpec::new(0.0328, 0.0194).with_current_limit(366.0)
    }

    /// Falcon 500 class (4.69 Nm stall at 257 A).
    pub const fn falcon_500() -> MotorSpec {
        MotorSpec::new(0.0467, 0.0182).with_current_limit(257.0)
    }

    /// NEO class (2.6 Nm stall at 105 A).
    pub const fn neo() -> MotorSpec {
        MotorSpec::new(0.114, 0.0248).with_current_limit(105.0)
    }

    /// NEO 550 class (0.97 Nm stall at 100 A).
    pub const fn neo_550() -> MotorSpec {
        MotorSpec::new(0.12, 0.0097).with_current_limit(100.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
