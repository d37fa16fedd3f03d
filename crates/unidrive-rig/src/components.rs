//! ECS components wrapping unidrive drivers and sensors.

use bevy::prelude::*;
use unidrive_motor::driver::MotorDriver;
use unidrive_motor::request::ControlRequest;
use unidrive_range::sensor::RangeSensor;

// ---------------------------------------------------------------------------
// MotorChannel
// ---------------------------------------------------------------------------

/// One motor driver on the control cycle.  The rig refreshes it every
/// frame; subsystem logic reads `driver.inputs()` and queues commands
/// through a sibling [`MotorCommand`].
#[derive(Component, Debug)]
pub struct MotorChannel {
    /// The wrapped driver.
    pub driver: MotorDriver,
}

impl MotorChannel {
    /// Wrap a driver for ECS scheduling.
    #[must_use]
    pub const fn new(driver: MotorDriver) -> Self {
        Self { driver }
    }
}

// ---------------------------------------------------------------------------
// MotorCommand
// ---------------------------------------------------------------------------

/// Pending control request for a sibling [`MotorChannel`].
///
/// Written by subsystem logic at any point in the frame, drained by the
/// rig at the start of the next cycle.  Writing twice in one cycle keeps
/// only the latest request, matching the driver's supersede semantics.
#[derive(Component, Debug, Default)]
pub struct MotorCommand {
    pending: Option<ControlRequest>,
}

impl MotorCommand {
    /// Queue `request` for the next cycle, superseding any pending one.
    pub const fn set(&mut self, request: ControlRequest) {
        self.pending = Some(request);
    }

    /// Take the pending request, leaving the inbox empty.
    pub const fn take(&mut self) -> Option<ControlRequest> {
        self.pending.take()
    }

    /// Whether a request is waiting.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

// ---------------------------------------------------------------------------
// RangeChannel
// ---------------------------------------------------------------------------

/// One range sensor on the control cycle.
#[derive(Component, Debug)]
pub struct RangeChannel {
    /// The wrapped sensor.
    pub sensor: RangeSensor,
}

impl RangeChannel {
    /// Wrap a sensor for ECS scheduling.
    #[must_use]
    pub const fn new(sensor: RangeSensor) -> Self {
        Self { sensor }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
