//! Signal conditioning for control loops.
//!
//! [`SlewRateLimiter`](slew::SlewRateLimiter) bounds how fast a scalar
//! command may change per second, independently in each direction —
//! typically smoothing manual control inputs before they reach a driver.
//! [`EdgeDetector`](trigger::EdgeDetector) and
//! [`Trigger`](trigger::Trigger) turn polled booleans into one-shot
//! rising/falling actions.

pub mod slew;
pub mod trigger;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::slew::SlewRateLimiter;
    pub use crate::trigger::{Edge, EdgeDetector, Trigger};
}
