use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_control_dt() -> f64 {
    0.02
}

// ---------------------------------------------------------------------------
// RunMode
// ---------------------------------------------------------------------------

/// Which backend a driver or sensor talks to.
///
/// Chosen once at construction and never re-evaluated: there is no
/// process-wide mutable mode flag.  Call sites must not branch on the mode
/// after a driver exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Physical hardware over the bus.
    #[default]
    Real,
    /// Internal physics model.
    Sim,
    /// No hardware writes; inputs come from log playback.
    Replay,
}

// ---------------------------------------------------------------------------
// CycleConfig
// ---------------------------------------------------------------------------

/// Control-cycle configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Nominal control period in seconds (default: 0.02 = 50 Hz).
    ///
    /// Nominal only: consumers measure the real elapsed time each cycle.
    #[serde(default = "default_control_dt")]
    pub control_dt: f64,

    /// Backend selection for every driver constructed from this config.
    #[serde(default)]
    pub run_mode: RunMode,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            control_dt: default_control_dt(),
            run_mode: RunMode::default(),
        }
    }
}

impl CycleConfig {
    /// Validate configuration.  Returns `Err` on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.control_dt.is_finite() || self.control_dt <= 0.0 {
            return Err(ConfigError::InvalidControlDt(self.control_dt));
        }
        Ok(())
    }

    /// Control rate in Hz.
    #[must_use]
    pub fn control_hz(&self) -> f64 {
        1.0 / self.control_dt
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(control_dt = config.control_dt, "loaded cycle config");
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
