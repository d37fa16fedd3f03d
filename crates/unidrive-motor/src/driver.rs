//! The unified motor driver.
//!
//! One control surface for position, velocity, and raw-voltage actuation
//! regardless of whether the actuator is physical or simulated, plus a
//! gear-ratio-aware view of hardware state.
//!
//! # Cycle contract
//!
//! `update_inputs` must be called once per control cycle before any read
//! of [`MotorInputs`]; it measures the real elapsed time since the
//! previous call, so irregular scheduling stays correct.  Nothing here
//! ever panics or propagates a fault out of the cycle: a misbehaving bus
//! degrades to stale data, a malformed request is rejected and the prior
//! one stays active.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use unidrive_core::error::RequestError;
use unidrive_core::time::{MonotonicTime, TimeSource};
use unidrive_core::units::GearRatio;

use crate::backend::{MotorBackend, NativeRequest};
use crate::bus::{DeviceId, MotorBus, MotorFrame};
use crate::request::ControlRequest;
use crate::sim::SimMotor;

// ---------------------------------------------------------------------------
// MotorInputs
// ---------------------------------------------------------------------------

/// Snapshot of motor state in mechanism units, refreshed once per cycle.
///
/// Owned exclusively by its driver; consumers read copies.  Serializable
/// so an external recorder can log it each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotorInputs {
    /// Mechanism position (rad).
    pub position_rads: f32,
    /// Mechanism velocity (rad/s).
    pub velocity_rad_per_sec: f32,
    /// Stator (torque-producing) current (A), signed.
    pub stator_current_amps: f32,
    /// Supply-side current draw (A).
    pub supply_current_amps: f32,
    /// Output voltage last applied by the controller (V).
    pub applied_volts: f32,
}

// ---------------------------------------------------------------------------
// MotorDriver
// ---------------------------------------------------------------------------

/// Unified driver for one motor, real or simulated.
///
/// Constructed once at subsystem initialization with a fixed device id,
/// gear ratio, and backend; lives for the process lifetime.
pub struct MotorDriver {
    id: DeviceId,
    gear_ratio: GearRatio,
    backend: MotorBackend,
    inputs: MotorInputs,
    active: ControlRequest,
    time: Box<dyn TimeSource>,
    last_update: Duration,
    bus_faults: u32,
}

impl MotorDriver {
    fn with_backend(id: DeviceId, gear_ratio: GearRatio, backend: MotorBackend) -> Self {
        let time: Box<dyn TimeSource> = Box::new(MonotonicTime::new());
        let last_update = time.now();
        Self {
            id,
            gear_ratio,
            backend,
            inputs: MotorInputs::default(),
            active: ControlRequest::default(),
            time,
            last_update,
            bus_faults: 0,
        }
    }

    /// Driver over a physical controller.
    pub fn real(id: DeviceId, bus: impl MotorBus + 'static, gear_ratio: GearRatio) -> Self {
        Self::with_backend(id, gear_ratio, MotorBackend::Real(Box::new(bus)))
    }

    /// Driver over a simulated motor.  The gear ratio comes from the
    /// model so the two can never disagree.
    pub fn sim(id: DeviceId, motor: SimMotor) -> Self {
        let gear_ratio = motor.gear_ratio();
        Self::with_backend(id, gear_ratio, MotorBackend::Sim(motor))
    }

    /// Driver whose inputs are fed by log playback; writes are dropped.
    pub fn replay(id: DeviceId, gear_ratio: GearRatio) -> Self {
        Self::with_backend(id, gear_ratio, MotorBackend::Replay)
    }

    /// Builder: replace the time source (tests, replay harnesses).
    /// Re-anchors the cycle clock on the new source.
    #[must_use]
    pub fn with_time_source(mut self, time: impl TimeSource + 'static) -> Self {
        self.last_update = time.now();
        self.time = Box::new(time);
        self
    }

    /// Bus address of this driver.
    #[must_use]
    pub const fn id(&self) -> DeviceId {
        self.id
    }

    /// Gear ratio between rotor and mechanism.
    #[must_use]
    pub const fn gear_ratio(&self) -> GearRatio {
        self.gear_ratio
    }

    /// Most recent snapshot.  Zeroed until the first `update_inputs`
    /// (drivers have a defined rest state; commanding before the first
    /// refresh is legal).
    #[must_use]
    pub const fn inputs(&self) -> MotorInputs {
        self.inputs
    }

    /// The currently active request.
    #[must_use]
    pub const fn active_request(&self) -> ControlRequest {
        self.active
    }

    /// Transient bus faults seen so far (reads and writes).
    #[must_use]
    pub const fn bus_faults(&self) -> u32 {
        self.bus_faults
    }

    /// Issue a new control request, superseding the active one.
    ///
    /// Mechanism units are converted to rotor units through the gear
    /// ratio; follower requests bypass conversion and forward the
    /// leader's raw output.  A malformed request is rejected and the
    /// prior active request remains in effect.
    ///
    /// # Errors
    ///
    /// [`RequestError`] if the request carries a non-finite value or
    /// follows its own device id.
    pub fn set_control(&mut self, request: ControlRequest) -> Result<(), RequestError> {
        request.validate(self.id)?;
        let native = self.to_native(request);
        if let Err(err) = self.backend.apply(native) {
            // Transient by policy: the request stays active and will take
            // effect once the bus recovers a write.
            self.bus_faults += 1;
            tracing::warn!(device = %self.id, error = %err, "motor write failed");
        }
        self.active = request;
        Ok(())
    }

    /// Refresh the snapshot.  Call exactly once per control cycle.
    ///
    /// A real-bus read failure retains the previous snapshot rather than
    /// surfacing a fault; a stalled driver must not stall the cycle.
    pub fn update_inputs(&mut self) {
        let now = self.time.now();
        let dt = now.saturating_sub(self.last_update).as_secs_f32();
        self.last_update = now;

        match self.backend.refresh(dt) {
            Ok(Some(frame)) => self.inputs = self.frame_to_inputs(frame),
            // Replay: the snapshot is owned by playback, keep it.
            Ok(None) => {}
            Err(err) => {
                self.bus_faults += 1;
                tracing::warn!(device = %self.id, error = %err, "motor read failed, keeping stale inputs");
            }
        }
    }

    /// Overwrite the backend's position reference with `position_rads`
    /// without moving the actuator (re-zero against an absolute encoder
    /// or home switch).
    ///
    /// Silently ignored on backends without a settable reference
    /// (Replay); a transient real-bus failure is swallowed the same way.
    pub fn reset(&mut self, position_rads: f32) {
        let rotor_rotations = self.gear_ratio.mechanism_to_rotor(position_rads);
        if let Err(err) = self.backend.set_reference(rotor_rotations) {
            self.bus_faults += 1;
            tracing::warn!(device = %self.id, error = %err, "position reference overwrite failed");
        }
    }

    /// Overwrite the snapshot directly.  Replay playback seam; on other
    /// backends the next `update_inputs` wins.
    pub fn load_inputs(&mut self, inputs: MotorInputs) {
        self.inputs = inputs;
    }

    fn to_native(&self, request: ControlRequest) -> NativeRequest {
        match request {
            ControlRequest::Voltage { volts } => NativeRequest::Voltage { volts },
            ControlRequest::Position {
                radians,
                feedforward_volts,
            } => NativeRequest::Position {
                rotor_rotations: self.gear_ratio.mechanism_to_rotor(radians),
                feedforward_volts,
            },
            ControlRequest::Velocity {
                rad_per_sec,
                feedforward_volts,
            } => NativeRequest::Velocity {
                rotor_rps: self.gear_ratio.mechanism_to_rotor_velocity(rad_per_sec),
                feedforward_volts,
            },
            // Followers mirror raw output; no unit conversion applies.
            ControlRequest::Follow { leader, invert } => NativeRequest::Follow { leader, invert },
        }
    }

    fn frame_to_inputs(&self, frame: MotorFrame) -> MotorInputs {
        MotorInputs {
            position_rads: self.gear_ratio.rotor_to_mechanism(frame.rotor_rotations),
            velocity_rad_per_sec: self.gear_ratio.rotor_to_mechanism_velocity(frame.rotor_rps),
            stator_current_amps: frame.stator_current_amps,
            supply_current_amps: frame.supply_current_amps,
            applied_volts: frame.applied_volts,
        }
    }
}

impl std::fmt::Debug for MotorDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotorDriver")
            .field("id", &self.id)
            .field("gear_ratio", &self.gear_ratio)
            .field("backend", &self.backend)
            .field("active", &self.active)
            .field("bus_faults", &self.bus_faults)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::f32::consts::{PI, TAU};
    use std::sync::{Arc, Mutex};

    use unidrive_core::error::BusError;
    use unidrive_core::time::StepTime;

    use super::*;
    use crate::presets;

    // -- In-file mock bus --

    #[derive(Debug, Default)]
    struct MockState {
        writes: Vec<NativeRequest>,
        references: Vec<f32>,
        frame: MotorFrame,
        fail_reads: bool,
        fail_writes: bool,
    }

    #[derive(Debug, Clone, Default)]
    struct MockBus(Arc<Mutex<MockState>>);

    impl MockBus {
        fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
            self.0.lock().expect("mock state lock")
        }

        fn record(&self, request: NativeRequest) -> Result<(), BusError> {
            let mut state = self.state();
            if state.fail_writes {
                return Err(BusError::Offline);
            }
            state.writes.push(request);
            Ok(())
        }
    }

    impl MotorBus for MockBus {
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
            let mut state = self.state();
            if state.fail_writes {
                return Err(BusError::Offline);
            }
            state.references.push(rotor_rotations);
            Ok(())
        }

        fn read_frame(&mut self) -> Result<MotorFrame, BusError> {
            let state = self.state();
            if state.fail_reads {
                return Err(BusError::Timeout { device: 0 });
            }
            Ok(state.frame)
        }
    }

    fn sim_driver(clock: &StepTime) -> MotorDriver {
        let motor =
            SimMotor::new(presets::motors::kraken_x60(), 0.002, GearRatio::DIRECT)
                .expect("valid physical model");
        MotorDriver::sim(DeviceId(1), motor).with_time_source(clock.clone())
    }

    // -- Simulated backend --

    #[test]
    fn inputs_are_zeroed_before_first_update() {
        let clock = StepTime::new();
        let driver = sim_driver(&clock);
        assert_eq!(driver.inputs(), MotorInputs::default());
    }

    #[test]
    fn set_control_before_first_update_is_legal() {
        let clock = StepTime::new();
        let mut driver = sim_driver(&clock);
        assert!(driver.set_control(ControlRequest::voltage(3.0)).is_ok());
    }

    #[test]
    fn constant_voltage_integrates_monotonically() {
        let clock = StepTime::new();
        let mut driver = sim_driver(&clock);
        driver
            .set_control(ControlRequest::voltage(3.0))
            .expect("finite request");

        clock.advance_secs(0.02);
        driver.update_inputs();
        let first = driver.inputs().velocity_rad_per_sec;
        assert!(first > 0.0);

        clock.advance_secs(0.02);
        driver.update_inputs();
        let second = driver.inputs().velocity_rad_per_sec;
        assert!(second > first);
    }

    #[test]
    fn zero_elapsed_update_is_idempotent() {
        let clock = StepTime::new();
        let mut driver = sim_driver(&clock);
        driver
            .set_control(ControlRequest::voltage(3.0))
            .expect("finite request");
        clock.advance_secs(0.02);
        driver.update_inputs();

        let snapshot = driver.inputs();
        driver.update_inputs(); // no elapsed time
        assert_eq!(driver.inputs(), snapshot);
    }

    #[test]
    fn reset_then_zero_time_update_reports_new_position() {
        let clock = StepTime::new();
        let mut driver = sim_driver(&clock);
        driver.reset(1.0);
        driver.update_inputs();
        assert!((driver.inputs().position_rads - 1.0).abs() < 1e-4);
    }

    #[test]
    fn rejected_request_keeps_prior_active() {
        let clock = StepTime::new();
        let mut driver = sim_driver(&clock);
        driver
            .set_control(ControlRequest::voltage(3.0))
            .expect("finite request");

        let err = driver.set_control(ControlRequest::position(f32::NAN));
        assert_eq!(err, Err(RequestError::NonFinite));
        assert_eq!(driver.active_request(), ControlRequest::voltage(3.0));

        // The sim keeps spinning up under the surviving voltage request.
        clock.advance_secs(0.02);
        driver.update_inputs();
        assert!(driver.inputs().velocity_rad_per_sec > 0.0);
    }

    // -- Real backend (mock bus) --

    #[test]
    fn position_request_converts_to_rotor_rotations() {
        let bus = MockBus::default();
        let ratio = GearRatio::new(2.0).expect("valid ratio");
        let mut driver = MotorDriver::real(DeviceId(3), bus.clone(), ratio);

        driver
            .set_control(ControlRequest::position(PI))
            .expect("finite request");

        // PI rad through a 2:1 reduction = one rotor rotation.
        let writes = bus.state().writes.clone();
        assert_eq!(writes.len(), 1);
        match writes[0] {
            NativeRequest::Position {
                rotor_rotations, ..
            } => assert!((rotor_rotations - 1.0).abs() < 1e-5),
            ref other => panic!("expected position write, got {other:?}"),
        }
    }

    #[test]
    fn velocity_request_converts_to_rotor_rps() {
        let bus = MockBus::default();
        let ratio = GearRatio::new(10.0).expect("valid ratio");
        let mut driver = MotorDriver::real(DeviceId(3), bus.clone(), ratio);

        driver
            .set_control(ControlRequest::velocity(TAU))
            .expect("finite request");

        match bus.state().writes[0] {
            NativeRequest::Velocity { rotor_rps, .. } => {
                assert!((rotor_rps - 10.0).abs() < 1e-4);
            }
            ref other => panic!("expected velocity write, got {other:?}"),
        };
    }

    #[test]
    fn follower_bypasses_unit_conversion() {
        let bus = MockBus::default();
        let ratio = GearRatio::new(99.0).expect("valid ratio");
        let mut driver = MotorDriver::real(DeviceId(3), bus.clone(), ratio);

        driver
            .set_control(ControlRequest::follow(DeviceId(4), true))
            .expect("valid follower");

        assert_eq!(
            bus.state().writes[0],
            NativeRequest::Follow {
                leader: DeviceId(4),
                invert: true
            }
        );
    }

    #[test]
    fn frame_converts_back_to_mechanism_units() {
        let bus = MockBus::default();
        bus.state().frame = MotorFrame {
            rotor_rotations: 50.0,
            rotor_rps: 5.0,
            stator_current_amps: 20.0,
            supply_current_amps: 4.0,
            applied_volts: 6.0,
        };
        let ratio = GearRatio::new(50.0).expect("valid ratio");
        let mut driver = MotorDriver::real(DeviceId(3), bus, ratio);

        driver.update_inputs();
        let inputs = driver.inputs();
        // 50 rotor rotations through 50:1 = one mechanism turn.
        assert!((inputs.position_rads - TAU).abs() < 1e-3);
        assert!((inputs.velocity_rad_per_sec - TAU / 10.0).abs() < 1e-3);
        assert!((inputs.stator_current_amps - 20.0).abs() < f32::EPSILON);
        assert!((inputs.applied_volts - 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn read_failure_keeps_stale_snapshot() {
        let bus = MockBus::default();
        bus.state().frame.rotor_rotations = 2.0;
        let mut driver = MotorDriver::real(DeviceId(7), bus.clone(), GearRatio::DIRECT);

        driver.update_inputs();
        let good = driver.inputs();
        assert!(good.position_rads > 0.0);

        {
            let mut state = bus.state();
            state.fail_reads = true;
            state.frame.rotor_rotations = 99.0;
        }
        driver.update_inputs();
        assert_eq!(driver.inputs(), good);
        assert_eq!(driver.bus_faults(), 1);
    }

    #[test]
    fn write_failure_keeps_request_active() {
        let bus = MockBus::default();
        bus.state().fail_writes = true;
        let mut driver = MotorDriver::real(DeviceId(7), bus, GearRatio::DIRECT);

        // The write fails on the wire but the intent survives.
        assert!(driver.set_control(ControlRequest::voltage(6.0)).is_ok());
        assert_eq!(driver.active_request(), ControlRequest::voltage(6.0));
        assert_eq!(driver.bus_faults(), 1);
    }

    #[test]
    fn reset_forwards_rotor_reference() {
        let bus = MockBus::default();
        let ratio = GearRatio::new(2.0).expect("valid ratio");
        let mut driver = MotorDriver::real(DeviceId(3), bus.clone(), ratio);

        driver.reset(PI);
        let references = bus.state().references.clone();
        assert_eq!(references.len(), 1);
        assert!((references[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn reset_swallows_bus_failure() {
        let bus = MockBus::default();
        bus.state().fail_writes = true;
        let mut driver = MotorDriver::real(DeviceId(3), bus, GearRatio::DIRECT);
        driver.reset(1.0); // must not panic or propagate
        assert_eq!(driver.bus_faults(), 1);
    }

    // -- Replay backend --

    #[test]
    fn replay_keeps_loaded_inputs_across_updates() {
        let mut driver = MotorDriver::replay(DeviceId(9), GearRatio::DIRECT);
        let played_back = MotorInputs {
            position_rads: 1.5,
            velocity_rad_per_sec: -2.0,
            ..MotorInputs::default()
        };
        driver.load_inputs(played_back);
        driver.update_inputs();
        assert_eq!(driver.inputs(), played_back);
    }

    #[test]
    fn replay_ignores_writes_and_reset() {
        let mut driver = MotorDriver::replay(DeviceId(9), GearRatio::DIRECT);
        assert!(driver.set_control(ControlRequest::voltage(6.0)).is_ok());
        driver.reset(3.0);
        assert_eq!(driver.bus_faults(), 0);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn driver_is_send_sync() {
        assert_send_sync::<MotorDriver>();
        assert_send_sync::<MotorInputs>();
    }
}
