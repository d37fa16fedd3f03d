//! Unified motor driver: one control surface for voltage, position, and
//! velocity actuation regardless of whether the actuator is physical or
//! simulated.
//!
//! # Pipeline
//!
//! ```text
//! ControlRequest ──► unit conversion ──► Backend (Real | Sim | Replay)
//!     MotorInputs ◄── unit conversion ◄── per-cycle refresh
//! ```
//!
//! # Quick Start
//!
//! ```
//! use unidrive_core::prelude::*;
//! use unidrive_motor::prelude::*;
//!
//! let sim = SimMotor::new(presets::motors::kraken_x60(), 0.002, GearRatio::DIRECT)
//!     .expect("valid physical model");
//! let mut driver = MotorDriver::sim(DeviceId(1), sim);
//!
//! driver
//!     .set_control(ControlRequest::voltage(3.0))
//!     .expect("finite request");
//! driver.update_inputs();
//! let snapshot = driver.inputs();
//! ```

pub mod backend;
pub mod bus;
pub mod control;
pub mod driver;
pub mod presets;
pub mod request;
pub mod sim;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::backend::MotorBackend;
    pub use crate::bus::{DeviceId, MotorBus, MotorFrame};
    pub use crate::control::{PositionPid, VelocityPd};
    pub use crate::driver::{MotorDriver, MotorInputs};
    pub use crate::presets;
    pub use crate::request::ControlRequest;
    pub use crate::sim::{MotorSpec, SimMotor};
}
