//! Scripted implementations of the hardware bus traits.
//!
//! Each bus is a cheap cloneable handle over shared state: the test keeps
//! one clone to script frames and inspect writes, the driver under test
//! owns another.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use unidrive_core::bus::DeviceId;
use unidrive_core::error::BusError;
use unidrive_motor::backend::NativeRequest;
use unidrive_motor::bus::{MotorBus, MotorFrame};
use unidrive_range::bus::{RangeBus, RangeFrame};

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking test thread must not hide results from the assertion
    // thread behind a poisoned lock.
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// ScriptedMotorBus
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MotorBusState {
    queued: VecDeque<MotorFrame>,
    last_frame: MotorFrame,
    writes: Vec<NativeRequest>,
    references: Vec<f32>,
    fail_reads: bool,
    fail_writes: bool,
}

/// A motor controller stand-in with scripted reads and recorded writes.
///
/// Reads drain the queued frames in order, then repeat the last one
/// (status frames on a real bus are sticky between updates).
#[derive(Debug, Clone, Default)]
pub struct ScriptedMotorBus(Arc<Mutex<MotorBusState>>);

impl ScriptedMotorBus {
    /// New bus with an all-zero sticky frame and nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame to be returned by the next unread `read_frame`.
    pub fn push_frame(&self, frame: MotorFrame) {
        lock_ignoring_poison(&self.0).queued.push_back(frame);
    }

    /// Replace the sticky frame returned once the queue is drained.
    pub fn set_frame(&self, frame: MotorFrame) {
        lock_ignoring_poison(&self.0).last_frame = frame;
    }

    /// Make every subsequent read fail (or recover).
    pub fn fail_reads(&self, fail: bool) {
        lock_ignoring_poison(&self.0).fail_reads = fail;
    }

    /// Make every subsequent write fail (or recover).
    pub fn fail_writes(&self, fail: bool) {
        lock_ignoring_poison(&self.0).fail_writes = fail;
    }

    /// Every control write seen so far, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<NativeRequest> {
        lock_ignoring_poison(&self.0).writes.clone()
    }

    /// The most recent control write, if any.
    #[must_use]
    pub fn last_write(&self) -> Option<NativeRequest> {
        lock_ignoring_poison(&self.0).writes.last().copied()
    }

    /// Every position-reference overwrite seen so far, in order.
    #[must_use]
    pub fn references(&self) -> Vec<f32> {
        lock_ignoring_poison(&self.0).references.clone()
    }

    fn record(&self, request: NativeRequest) -> Result<(), BusError> {
        let mut state = lock_ignoring_poison(&self.0);
        if state.fail_writes {
            return Err(BusError::Offline);
        }
        state.writes.push(request);
        Ok(())
    }
}

impl MotorBus for ScriptedMotorBus {
    fn write_voltage(&mut self, volts: f32) -> Result<(), BusError> {
        self.record(NativeRequest::Voltage { volts })
    }

    fn write_position(
        &mut self,
        rotor_rotations: f32,
        feedforward_volts: f32,
    ) -> Result<(), BusError> {
        self.record(NativeRequest::Position {
            rotor_rotations,
            feedforward_volts,
        })
    }

    fn write_velocity(&mut self, rotor_rps: f32, feedforward_volts: f32) -> Result<(), BusError> {
        self.record(NativeRequest::Velocity {
            rotor_rps,
            feedforward_volts,
        })
    }

    fn write_follow(&mut self, leader: DeviceId, invert: bool) -> Result<(), BusError> {
        self.record(NativeRequest::Follow { leader, invert })
    }

    fn set_reference(&mut self, rotor_rotations: f32) -> Result<(), BusError> {
        let mut state = lock_ignoring_poison(&self.0);
        if state.fail_writes {
            return Err(BusError::Offline);
        }
        state.references.push(rotor_rotations);
        Ok(())
    }

    fn read_frame(&mut self) -> Result<MotorFrame, BusError> {
        let mut state = lock_ignoring_poison(&self.0);
        if state.fail_reads {
            return Err(BusError::Timeout { device: 0 });
        }
        if let Some(frame) = state.queued.pop_front() {
            state.last_frame = frame;
        }
        Ok(state.last_frame)
    }
}

// ---------------------------------------------------------------------------
// ScriptedRangeBus
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RangeBusState {
    queued: VecDeque<RangeFrame>,
    last_frame: RangeFrame,
    fail_reads: bool,
}

/// A range sensor stand-in with scripted reads.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRangeBus(Arc<Mutex<RangeBusState>>);

impl ScriptedRangeBus {
    /// New bus with an all-zero sticky frame and nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame to be returned by the next unread `read_frame`.
    pub fn push_frame(&self, frame: RangeFrame) {
        lock_ignoring_poison(&self.0).queued.push_back(frame);
    }

    /// Replace the sticky frame returned once the queue is drained.
    pub fn set_frame(&self, frame: RangeFrame) {
        lock_ignoring_poison(&self.0).last_frame = frame;
    }

    /// Make every subsequent read fail (or recover).
    pub fn fail_reads(&self, fail: bool) {
        lock_ignoring_poison(&self.0).fail_reads = fail;
    }
}

impl RangeBus for ScriptedRangeBus {
    fn read_frame(&mut self) -> Result<RangeFrame, BusError> {
        let mut state = lock_ignoring_poison(&self.0);
        if state.fail_reads {
            return Err(BusError::Timeout { device: 0 });
        }
        if let Some(frame) = state.queued.pop_front() {
            state.last_frame = frame;
        }
        Ok(state.last_frame)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_bus_records_writes_in_order() {
        let mut bus = ScriptedMotorBus::new();
        bus.write_voltage(3.0).expect("scripted write");
        bus.write_velocity(10.0, 0.5).expect("scripted write");

        let writes = bus.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], NativeRequest::Voltage { volts: 3.0 });
        assert_eq!(bus.last_write(), Some(writes[1]));
    }

    #[test]
    fn motor_bus_drains_queue_then_repeats() {
        let mut bus = ScriptedMotorBus::new();
        bus.push_frame(MotorFrame {
            rotor_rotations: 1.0,
            ..MotorFrame::default()
        });

        let first = bus.read_frame().expect("scripted read");
        assert!((first.rotor_rotations - 1.0).abs() < f32::EPSILON);
        // Queue drained: the last frame is sticky.
        let second = bus.read_frame().expect("scripted read");
        assert_eq!(second, first);
    }

    #[test]
    fn motor_bus_injects_faults() {
        let mut bus = ScriptedMotorBus::new();
        bus.fail_reads(true);
        assert!(bus.read_frame().is_err());
        bus.fail_reads(false);
        assert!(bus.read_frame().is_ok());

        bus.fail_writes(true);
        assert!(bus.write_voltage(1.0).is_err());
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn range_bus_drains_queue_then_repeats() {
        let mut bus = ScriptedRangeBus::new();
        bus.push_frame(RangeFrame {
            distance_meters: 0.4,
            is_detecting: true,
        });

        let first = bus.read_frame().expect("scripted read");
        assert!(first.is_detecting);
        let second = bus.read_frame().expect("scripted read");
        assert_eq!(second, first);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn scripted_buses_are_send_sync() {
        assert_send_sync::<ScriptedMotorBus>();
        assert_send_sync::<ScriptedRangeBus>();
    }
}
