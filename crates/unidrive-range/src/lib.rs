//! Unified range sensor: one `{distance, is_detecting}` surface regardless
//! of whether the sensor is physical or simulated.
//!
//! # Quick Start
//!
//! ```
//! use unidrive_core::prelude::*;
//! use unidrive_range::prelude::*;
//!
//! let flag = DetectFlag::new();
//! let mut sensor = RangeSensor::sim(DeviceId(20), SimRange::new(flag.clone()));
//!
//! flag.set(true);
//! sensor.update_inputs();
//! assert!(sensor.is_in_range());
//! ```

pub mod backend;
pub mod bus;
pub mod sensor;
pub mod sim;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::backend::RangeBackend;
    pub use crate::bus::{RangeBus, RangeFrame};
    pub use crate::sensor::{RangeInputs, RangeSensor};
    pub use crate::sim::{DetectFlag, SimRange};
}
