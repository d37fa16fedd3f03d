//! Edge detection over polled boolean conditions.
//!
//! The control loop polls conditions once per cycle; there is no event
//! subscription machinery.  [`EdgeDetector`] reports transitions,
//! [`Trigger`] attaches one-shot actions to them.

// ---------------------------------------------------------------------------
// EdgeDetector
// ---------------------------------------------------------------------------

/// Transition observed between two consecutive polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// No transition (or first poll, which only primes the detector).
    None,
    /// False to true.
    Rising,
    /// True to false.
    Falling,
}

/// Detects edges in a polled boolean sequence.
///
/// The first poll primes the detector and never reports an edge; a
/// condition that is already true at startup must not fire a one-shot
/// action.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    last: Option<bool>,
}

impl EdgeDetector {
    /// Unprimed detector.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Feed the current condition value; returns the observed edge.
    pub const fn poll(&mut self, value: bool) -> Edge {
        let edge = match self.last {
            None => Edge::None,
            Some(last) if last == value => Edge::None,
            Some(_) if value => Edge::Rising,
            Some(_) => Edge::Falling,
        };
        self.last = Some(value);
        edge
    }
}

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// One-shot actions dispatched on condition edges.
///
/// Poll once per cycle; the rising callback fires exactly once per
/// false-to-true transition, the falling callback per true-to-false.
#[derive(Default)]
pub struct Trigger {
    detector: EdgeDetector,
    on_rising: Option<Box<dyn FnMut() + Send>>,
    on_falling: Option<Box<dyn FnMut() + Send>>,
}

impl Trigger {
    /// Trigger with no actions attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: run `action` on each rising edge.
    #[must_use]
    pub fn on_rising(mut self, action: impl FnMut() + Send + 'static) -> Self {
        self.on_rising = Some(Box::new(action));
        self
    }

    /// Builder: run `action` on each falling edge.
    #[must_use]
    pub fn on_falling(mut self, action: impl FnMut() + Send + 'static) -> Self {
        self.on_falling = Some(Box::new(action));
        self
    }

    /// Feed the current condition value, dispatching any attached action.
    /// Returns the observed edge.
    pub fn poll(&mut self, value: bool) -> Edge {
        let edge = self.detector.poll(value);
        match edge {
            Edge::Rising => {
                if let Some(action) = self.on_rising.as_mut() {
                    action();
                }
            }
            Edge::Falling => {
                if let Some(action) = self.on_falling.as_mut() {
                    action();
                }
            }
            Edge::None => {}
        }
        edge
    }
}

impl std::fmt::Debug for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trigger")
            .field("detector", &self.detector)
            .field("has_rising", &self.on_rising.is_some())
            .field("has_falling", &self.on_falling.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
