//! Test support for the unidrive workspace.
//!
//! Scripted implementations of the hardware bus traits, so any crate's
//! test suite can stand in for a physical device: queue up frames to be
//! read, record every write, and inject bus faults.

pub mod mocks;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::mocks::{ScriptedMotorBus, ScriptedRangeBus};
}
