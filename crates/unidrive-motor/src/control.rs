//! Closed-loop controllers used by the simulated backend.
//!
//! Real motor controllers run their position/velocity loops onboard; the
//! simulated backend runs these instead, so closed-loop requests behave
//! identically in both modes.  Output domain is volts.

// ---------------------------------------------------------------------------
// PositionPid
// ---------------------------------------------------------------------------

/// PID controller tracking a rotor position setpoint.
///
/// Gains:
/// - `kp`: V/rotation — proportional.
/// - `ki`: V/(rotation·s) — integral.
/// - `kd`: V·s/rotation — derivative.
///
/// Features:
/// - Anti-windup via integral clamping.
/// - Output clamping (defaults to a 12 V bus).
/// - Derivative-of-error (not derivative-of-measurement).
#[derive(Clone, Debug)]
pub struct PositionPid {
    kp: f32,
    ki: f32,
    kd: f32,
    output_limit: f32,
    integral_limit: f32,
    integral: f32,
    last_error: f32,
    initialized: bool,
}

impl PositionPid {
    /// Create a new PID controller with the given gains.
    ///
    /// Default output limit: `12.0 V`.  Default integral limit: `6.0`.
    #[must_use]
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            output_limit: 12.0,
            integral_limit: 6.0,
            integral: 0.0,
            last_error: 0.0,
            initialized: false,
        }
    }

    /// Set the output clamp limit (symmetric: `[-limit, limit]` V).
    #[must_use]
    pub const fn with_output_limit(mut self, limit: f32) -> Self {
        self.output_limit = limit;
        self
    }

    /// Set the integral windup limit.
    #[must_use]
    pub const fn with_integral_limit(mut self, limit: f32) -> Self {
        self.integral_limit = limit;
        self
    }

    /// Compute the output voltage (V).
    ///
    /// - `setpoint`: target rotor position (rotations).
    /// - `measured`: current rotor position (rotations).
    /// - `dt`: elapsed time (seconds), must be > 0.
    pub fn compute(&mut self, setpoint: f32, measured: f32, dt: f32) -> f32 {
        let error = setpoint - measured;

        // Integral term with anti-windup.
        self.integral += error * dt;
        self.integral = self
            .integral
            .clamp(-self.integral_limit, self.integral_limit);

        // Derivative term (of error).  First call has no history.
        let derivative = if self.initialized {
            (error - self.last_error) / dt
        } else {
            self.initialized = true;
            0.0
        };
        self.last_error = error;

        let output = self
            .kd
            .mul_add(derivative, self.kp.mul_add(error, self.ki * self.integral));
        output.clamp(-self.output_limit, self.output_limit)
    }

    /// Reset integral and derivative state.
    pub const fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
        self.initialized = false;
    }

    /// Returns the accumulated integral term.
    #[must_use]
    pub const fn integral(&self) -> f32 {
        self.integral
    }

    /// Returns the proportional gain.
    #[must_use]
    pub const fn kp(&self) -> f32 {
        self.kp
    }

    /// Returns the integral gain.
    #[must_use]
    pub const fn ki(&self) -> f32 {
        self.ki
    }

    /// Returns the derivative gain.
    #[must_use]
    pub const fn kd(&self) -> f32 {
        self.kd
    }
}

// ---------------------------------------------------------------------------
// VelocityPd
// ---------------------------------------------------------------------------

/// PD controller tracking a rotor velocity setpoint.
///
/// Output: `kp × error + kd × d(error)/dt`, in volts.
///
/// Gains:
/// - `kp`: V/(rotation/s).
/// - `kd`: V·s/(rotation/s).
#[derive(Clone, Debug)]
pub struct VelocityPd {
    /// Proportional gain.
    pub kp: f32,
    /// Derivative gain.
    pub kd: f32,
    last_error: f32,
    initialized: bool,
}

impl VelocityPd {
    /// Create a new PD controller.
    #[must_use]
    pub const fn new(kp: f32, kd: f32) -> Self {
        Self {
            kp,
            kd,
            last_error: 0.0,
            initialized: false,
        }
    }

    /// Compute the output voltage (V).
    ///
    /// - `setpoint`: target rotor velocity (rotations/s).
    /// - `measured`: current rotor velocity (rotations/s).
    /// - `dt`: elapsed time (seconds), must be > 0.
    pub fn compute(&mut self, setpoint: f32, measured: f32, dt: f32) -> f32 {
        let error = setpoint - measured;
        let derivative = if self.initialized {
            (error - self.last_error) / dt
        } else {
            self.initialized = true;
            0.0
        };
        self.last_error = error;
        self.kp.mul_add(error, self.kd * derivative)
    }

    /// Reset derivative state.
    pub const fn reset(&mut self) {
        self.last_error = 0.0;
        self.initialized = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
