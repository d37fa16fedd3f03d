//! Slew rate limiter for scalar command signals.

use std::time::Duration;

use unidrive_core::error::ConfigError;
use unidrive_core::time::{MonotonicTime, TimeSource};

// ---------------------------------------------------------------------------
// SlewRateLimiter
// ---------------------------------------------------------------------------

/// Bounds the per-second rate of change of a scalar signal, independently
/// in the positive and negative direction.
///
/// Elapsed time is measured from a [`TimeSource`] on every `calculate`
/// call, not assumed from the nominal control period, so the bound holds
/// under scheduler jitter.  With positive limit `p` and negative limit
/// `n` (n < 0), the output moves by at most `p·dt` upward and `|n|·dt`
/// downward per call.
pub struct SlewRateLimiter {
    positive_limit: f32,
    negative_limit: f32,
    value: f32,
    time: Box<dyn TimeSource>,
    last_time: Duration,
}

impl SlewRateLimiter {
    /// Limiter with independent directional limits (units/s), starting
    /// at zero.  `positive_limit` must be finite and > 0;
    /// `negative_limit` finite and < 0.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] when a limit has the wrong sign or
    /// is not finite.
    pub fn new(positive_limit: f32, negative_limit: f32) -> Result<Self, ConfigError> {
        if !positive_limit.is_finite() || positive_limit <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "positive_limit".into(),
                message: format!("{positive_limit} (must be finite and > 0)"),
            });
        }
        if !negative_limit.is_finite() || negative_limit >= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "negative_limit".into(),
                message: format!("{negative_limit} (must be finite and < 0)"),
            });
        }
        let time: Box<dyn TimeSource> = Box::new(MonotonicTime::new());
        let last_time = time.now();
        Ok(Self {
            positive_limit,
            negative_limit,
            value: 0.0,
            time,
            last_time,
        })
    }

    /// Limiter with the same magnitude in both directions.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] when `rate` is not finite and > 0.
    pub fn with_limit(rate: f32) -> Result<Self, ConfigError> {
        Self::new(rate, -rate)
    }

    /// Builder: replace the time source (tests, replay harnesses).
    /// Re-anchors the elapsed-time measurement on the new source.
    #[must_use]
    pub fn with_time_source(mut self, time: impl TimeSource + 'static) -> Self {
        self.last_time = time.now();
        self.time = Box::new(time);
        self
    }

    /// Builder: start from `value` instead of zero.
    #[must_use]
    pub fn with_initial_value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }

    /// Advance toward `input`, moving no faster than the configured
    /// limits allow over the measured elapsed time.
    pub fn calculate(&mut self, input: f32) -> f32 {
        let now = self.time.now();
        let dt = now.saturating_sub(self.last_time).as_secs_f32();
        self.last_time = now;

        let delta = input - self.value;
        self.value += delta.clamp(self.negative_limit * dt, self.positive_limit * dt);
        self.value
    }

    /// Jump directly to `value` and restart the elapsed-time measurement.
    pub fn reset(&mut self, value: f32) {
        self.value = value;
        self.last_time = self.time.now();
    }

    /// Output of the most recent `calculate` (or `reset`).
    #[must_use]
    pub const fn last_value(&self) -> f32 {
        self.value
    }
}

impl std::fmt::Debug for SlewRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlewRateLimiter")
            .field("positive_limit", &self.positive_limit)
            .field("negative_limit", &self.negative_limit)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
