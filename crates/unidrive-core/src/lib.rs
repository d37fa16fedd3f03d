// unidrive-core: errors, config, time sources, and unit conversion for the
// unidrive hardware abstraction layer.

pub mod bus;
pub mod config;
pub mod error;
pub mod time;
pub mod units;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::bus::DeviceId;
    pub use crate::config::{CycleConfig, RunMode};
    pub use crate::error::{BusError, ConfigError, RequestError, UnidriveError};
    pub use crate::time::{MonotonicTime, StepTime, TimeSource};
    pub use crate::units::GearRatio;
}
