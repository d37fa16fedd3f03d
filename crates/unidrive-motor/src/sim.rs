//! Simulated motor backend: a single-degree-of-freedom rigid body behind
//! the same control surface as real hardware.
//!
//! # Physics
//!
//! Resistive electrical model (inductance neglected at control rates):
//! `i = (V - ke·ω_rotor) / R`, clamped to the current limit.
//! Rotor torque `T = kt·i`, multiplied by the gear ratio onto the
//! mechanism inertia, then semi-implicit Euler: velocity first, position
//! from the *new* velocity.
//!
//! Closed-loop requests run the onboard-loop stand-ins from
//! [`crate::control`].  Follower requests produce no torque here — the
//! real hardware handles following in firmware, and a single sim motor
//! has no leader to read.  Documented unsupported, not an error.

use std::f32::consts::TAU;

use unidrive_core::error::ConfigError;
use unidrive_core::units::GearRatio;

use crate::backend::NativeRequest;
use crate::bus::MotorFrame;
use crate::control::{PositionPid, VelocityPd};

// ---------------------------------------------------------------------------
// MotorSpec
// ---------------------------------------------------------------------------

/// Electrical constants of a brushless motor.
///
/// For an ideal motor `ke = kt` (back-EMF constant in V/(rad/s) equals the
/// torque constant in Nm/A), so only `kt` is carried.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorSpec {
    /// Phase resistance (Ohms).
    pub resistance_ohms: f32,
    /// Torque constant (Nm/A), also used as the back-EMF constant.
    pub kt_nm_per_amp: f32,
    /// Bus voltage clamp (V).
    pub max_voltage: f32,
    /// Stator current clamp (A).
    pub current_limit_amps: f32,
}

impl MotorSpec {
    /// Create a spec with a 12 V bus and a 300 A current clamp.
    #[must_use]
    pub const fn new(resistance_ohms: f32, kt_nm_per_amp: f32) -> Self {
        Self {
            resistance_ohms,
            kt_nm_per_amp,
            max_voltage: 12.0,
            current_limit_amps: 300.0,
        }
    }

    /// Set the stator current clamp (A).
    #[must_use]
    pub const fn with_current_limit(mut self, amps: f32) -> Self {
        self.current_limit_amps = amps;
        self
    }

    /// Set the bus voltage clamp (V).
    #[must_use]
    pub const fn with_max_voltage(mut self, volts: f32) -> Self {
        self.max_voltage = volts;
        self
    }

    /// Validate the spec.  All constants must be finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("resistance_ohms", self.resistance_ohms),
            ("kt_nm_per_amp", self.kt_nm_per_amp),
            ("max_voltage", self.max_voltage),
            ("current_limit_amps", self.current_limit_amps),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    message: format!("{value} must be finite and > 0"),
                });
            }
        }
        Ok(())
    }

    /// Rotor free speed (rad/s) at the given voltage.
    #[must_use]
    pub fn free_speed_rad_per_sec(&self, volts: f32) -> f32 {
        volts / self.kt_nm_per_amp
    }
}

// ---------------------------------------------------------------------------
// SimMotor
// ---------------------------------------------------------------------------

/// Physics model standing in for one motor controller plus its mechanism.
///
/// State is mechanism-side (rad, rad/s); frames are emitted rotor-native
/// like real hardware would report them.
#[derive(Clone, Debug)]
pub struct SimMotor {
    spec: MotorSpec,
    inertia_kg_m2: f32,
    gear_ratio: GearRatio,
    position_controller: PositionPid,
    velocity_controller: VelocityPd,
    request: NativeRequest,
    position_rads: f32,
    velocity_rad_per_sec: f32,
    applied_volts: f32,
    stator_current_amps: f32,
    supply_current_amps: f32,
}

impl SimMotor {
    /// Create a simulated motor.
    ///
    /// `inertia_kg_m2` is the mechanism-side moment of inertia.  Fails on
    /// a non-finite or non-positive inertia or an invalid [`MotorSpec`]:
    /// an unusable physical model must not exist.
    pub fn new(
        spec: MotorSpec,
        inertia_kg_m2: f32,
        gear_ratio: GearRatio,
    ) -> Result<Self, ConfigError> {
        spec.validate()?;
        if !inertia_kg_m2.is_finite() || inertia_kg_m2 <= 0.0 {
            return Err(ConfigError::InvalidInertia(inertia_kg_m2));
        }
        Ok(Self {
            spec,
            inertia_kg_m2,
            gear_ratio,
            position_controller: PositionPid::new(8.0, 0.0, 0.2),
            velocity_controller: VelocityPd::new(0.12, 0.0),
            request: NativeRequest::default(),
            position_rads: 0.0,
            velocity_rad_per_sec: 0.0,
            applied_volts: 0.0,
            stator_current_amps: 0.0,
            supply_current_amps: 0.0,
        })
    }

    /// Builder: position-loop gains (V/rotation domain).
    #[must_use]
    pub const fn with_position_gains(mut self, kp: f32, ki: f32, kd: f32) -> Self {
        self.position_controller = PositionPid::new(kp, ki, kd);
        self
    }

    /// Builder: velocity-loop gains (V/(rotation/s) domain).
    #[must_use]
    pub const fn with_velocity_gains(mut self, kp: f32, kd: f32) -> Self {
        self.velocity_controller = VelocityPd::new(kp, kd);
        self
    }

    /// Gear ratio this model was built with.
    #[must_use]
    pub const fn gear_ratio(&self) -> GearRatio {
        self.gear_ratio
    }

    /// Mechanism position (rad).
    #[must_use]
    pub const fn position_rads(&self) -> f32 {
        self.position_rads
    }

    /// Mechanism velocity (rad/s).
    #[must_use]
    pub const fn velocity_rad_per_sec(&self) -> f32 {
        self.velocity_rad_per_sec
    }

    /// Replace the active request.  Switching control modes clears the
    /// controller state accumulated under the old mode.
    pub fn set_request(&mut self, request: NativeRequest) {
        if std::mem::discriminant(&self.request) != std::mem::discriminant(&request) {
            self.position_controller.reset();
            self.velocity_controller.reset();
        }
        self.request = request;
    }

    /// Overwrite the position reference (rotor rotations) without motion.
    pub fn set_reference(&mut self, rotor_rotations: f32) {
        self.position_rads = self.gear_ratio.rotor_to_mechanism(rotor_rotations);
    }

    /// Advance the model by `dt` seconds and return the resulting frame.
    ///
    /// `dt <= 0` performs no integration (zero-time refresh is a no-op)
    /// but still reports the current state.
    pub fn step(&mut self, dt: f32) -> MotorFrame {
        if dt > 0.0 {
            self.integrate(dt);
        }
        self.frame()
    }

    fn integrate(&mut self, dt: f32) {
        let rotor_rotations = self.gear_ratio.mechanism_to_rotor(self.position_rads);
        let rotor_rps = self
            .gear_ratio
            .mechanism_to_rotor_velocity(self.velocity_rad_per_sec);

        let volts = match self.request {
            NativeRequest::Voltage { volts } => volts,
            NativeRequest::Position {
                rotor_rotations: target,
                feedforward_volts,
            } => {
                self.position_controller
                    .compute(target, rotor_rotations, dt)
                    + feedforward_volts
            }
            NativeRequest::Velocity {
                rotor_rps: target,
                feedforward_volts,
            } => self.velocity_controller.compute(target, rotor_rps, dt) + feedforward_volts,
            // Following is a firmware feature; a lone sim motor coasts.
            NativeRequest::Follow { .. } => 0.0,
        };
        let volts = volts.clamp(-self.spec.max_voltage, self.spec.max_voltage);

        let rotor_rad_per_sec = rotor_rps * TAU;
        let back_emf = self.spec.kt_nm_per_amp * rotor_rad_per_sec;
        let current = ((volts - back_emf) / self.spec.resistance_ohms)
            .clamp(-self.spec.current_limit_amps, self.spec.current_limit_amps);

        let rotor_torque = self.spec.kt_nm_per_amp * current;
        let mechanism_torque = rotor_torque * self.gear_ratio.ratio();
        let accel = mechanism_torque / self.inertia_kg_m2;

        // Semi-implicit Euler: velocity first, position from new velocity.
        self.velocity_rad_per_sec += accel * dt;
        self.position_rads += self.velocity_rad_per_sec * dt;

        self.applied_volts = volts;
        self.stator_current_amps = current;
        self.supply_current_amps = (current * volts).abs() / self.spec.max_voltage;
    }

    fn frame(&self) -> MotorFrame {
        MotorFrame {
            rotor_rotations: self.gear_ratio.mechanism_to_rotor(self.position_rads),
            rotor_rps: self
                .gear_ratio
                .mechanism_to_rotor_velocity(self.velocity_rad_per_sec),
            stator_current_amps: self.stator_current_amps,
            supply_current_amps: self.supply_current_amps,
            applied_volts: self.applied_volts,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    const DT: f32 = 0.02;

    fn flywheel() -> SimMotor {
        SimMotor::new(presets::motors::kraken_x60(), 0.002, GearRatio::DIRECT)
            .expect("valid physical model")
    }

    #[test]
    fn rejects_zero_inertia() {
        let spec = presets::motors::kraken_x60();
        assert!(matches!(
            SimMotor::new(spec, 0.0, GearRatio::DIRECT),
            Err(ConfigError::InvalidInertia(_))
        ));
    }

    #[test]
    fn rejects_negative_inertia() {
        let spec = presets::motors::kraken_x60();
        assert!(SimMotor::new(spec, -0.5, GearRatio::DIRECT).is_err());
    }

    #[test]
    fn rejects_bad_spec() {
        let spec = MotorSpec::new(0.0, 0.019);
        assert!(SimMotor::new(spec, 0.002, GearRatio::DIRECT).is_err());
    }

    #[test]
    fn spec_free_speed() {
        let spec = MotorSpec::new(0.033, 0.02);
        assert!((spec.free_speed_rad_per_sec(12.0) - 600.0).abs() < 1e-3);
    }

    #[test]
    fn voltage_spins_up_monotonically() {
        // 3.0 V on a 0.002 kg·m² flywheel: velocity after one 20 ms step
        // must be positive and strictly below the velocity after two.
        let mut motor = flywheel();
        motor.set_request(NativeRequest::Voltage { volts: 3.0 });
        let first = motor.step(DT);
        assert!(first.rotor_rps > 0.0);
        let second = motor.step(DT);
        assert!(second.rotor_rps > first.rotor_rps);
    }

    #[test]
    fn zero_dt_step_is_a_no_op() {
        let mut motor = flywheel();
        motor.set_request(NativeRequest::Voltage { volts: 3.0 });
        let moved = motor.step(DT);
        let frozen = motor.step(0.0);
        assert_eq!(moved, frozen);
    }

    #[test]
    fn approaches_free_speed() {
        let mut motor = flywheel();
        let volts = 3.0;
        motor.set_request(NativeRequest::Voltage { volts });
        for _ in 0..2_000 {
            motor.step(DT);
        }
        let spec = presets::motors::kraken_x60();
        let free_speed = spec.free_speed_rad_per_sec(volts);
        assert!((motor.velocity_rad_per_sec() - free_speed).abs() / free_speed < 0.01);
    }

    #[test]
    fn negative_voltage_spins_backwards() {
        let mut motor = flywheel();
        motor.set_request(NativeRequest::Voltage { volts: -3.0 });
        motor.step(DT);
        assert!(motor.velocity_rad_per_sec() < 0.0);
        assert!(motor.position_rads() < 0.0);
    }

    #[test]
    fn current_is_clamped() {
        let spec = MotorSpec::new(0.01, 0.02).with_current_limit(40.0);
        let mut motor =
            SimMotor::new(spec, 0.002, GearRatio::DIRECT).expect("valid physical model");
        motor.set_request(NativeRequest::Voltage { volts: 12.0 });
        let frame = motor.step(DT);
        assert!((frame.stator_current_amps - 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn velocity_loop_tracks_setpoint() {
        let mut motor = flywheel().with_velocity_gains(0.3, 0.0);
        let target_rps = 10.0;
        // kv feedforward cancels back-EMF at the setpoint; the P term only
        // has to fight the transient.
        let spec = presets::motors::kraken_x60();
        let kv = spec.kt_nm_per_amp * TAU;
        motor.set_request(NativeRequest::Velocity {
            rotor_rps: target_rps,
            feedforward_volts: kv * target_rps,
        });
        for _ in 0..2_000 {
            motor.step(DT);
        }
        let frame = motor.step(DT);
        assert!((frame.rotor_rps - target_rps).abs() < 0.2);
    }

    #[test]
    fn position_loop_moves_toward_setpoint() {
        let mut motor = flywheel().with_position_gains(12.0, 0.0, 0.8);
        motor.set_request(NativeRequest::Position {
            rotor_rotations: 0.5,
            feedforward_volts: 0.0,
        });
        motor.step(DT);
        // First applied voltage must push in the setpoint direction.
        assert!(motor.frame().applied_volts > 0.0);
        assert!(motor.velocity_rad_per_sec() > 0.0);
    }

    #[test]
    fn feedforward_adds_to_loop_output() {
        let mut at_rest = flywheel().with_velocity_gains(0.0, 0.0);
        at_rest.set_request(NativeRequest::Velocity {
            rotor_rps: 0.0,
            feedforward_volts: 2.0,
        });
        let frame = at_rest.step(DT);
        assert!((frame.applied_volts - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn follow_produces_no_torque() {
        let mut motor = flywheel();
        motor.set_request(NativeRequest::Follow {
            leader: crate::bus::DeviceId(2),
            invert: false,
        });
        let frame = motor.step(DT);
        assert!(frame.rotor_rps.abs() < f32::EPSILON);
        assert!(frame.applied_volts.abs() < f32::EPSILON);
    }

    #[test]
    fn set_reference_moves_position_only() {
        let mut motor = flywheel();
        motor.set_reference(2.0);
        let frame = motor.step(0.0);
        assert!((frame.rotor_rotations - 2.0).abs() < 1e-4);
        assert!(frame.rotor_rps.abs() < f32::EPSILON);
    }

    #[test]
    fn set_reference_respects_gear_ratio() {
        let spec = presets::motors::kraken_x60();
        let ratio = GearRatio::new(50.0).expect("valid ratio");
        let mut motor = SimMotor::new(spec, 0.002, ratio).expect("valid physical model");
        motor.set_reference(50.0);
        // 50 rotor rotations through a 50:1 reduction = one mechanism turn.
        assert!((motor.position_rads() - TAU).abs() < 1e-3);
    }

    #[test]
    fn mode_switch_clears_controller_state() {
        let mut motor = flywheel().with_position_gains(0.0, 10.0, 0.0);
        motor.set_request(NativeRequest::Position {
            rotor_rotations: 5.0,
            feedforward_volts: 0.0,
        });
        for _ in 0..50 {
            motor.step(DT);
        }
        motor.set_request(NativeRequest::Voltage { volts: 0.0 });
        motor.set_request(NativeRequest::Position {
            rotor_rotations: 5.0,
            feedforward_volts: 0.0,
        });
        // Fresh integral after the round trip through voltage mode.
        let frame = motor.step(DT);
        assert!(frame.applied_volts.abs() < 12.0);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn sim_types_are_send_sync() {
        assert_send_sync::<MotorSpec>();
        assert_send_sync::<SimMotor>();
    }
}
