use thiserror::Error;

/// Top-level error type for the unidrive workspace.
#[derive(Debug, Error)]
pub enum UnidriveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),
}

/// Configuration errors.  Fatal at construction: a driver with an unusable
/// physical model must refuse to exist.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid control_dt: {0} (must be > 0)")]
    InvalidControlDt(f64),

    #[error("Invalid gear ratio: {0} (must be finite and > 0)")]
    InvalidGearRatio(f32),

    #[error("Invalid moment of inertia: {0} kg·m² (must be finite and > 0)")]
    InvalidInertia(f32),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Hardware bus errors (Real backends only).
///
/// These are transient by policy: callers retain the last known snapshot
/// and keep cycling rather than propagating a fault out of the control
/// loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("Device {device} did not respond")]
    Timeout { device: u8 },

    #[error("Device {device} rejected write: {message}")]
    WriteRejected { device: u8, message: String },

    #[error("Bus offline")]
    Offline,
}

/// Control request validation errors.
///
/// Copy + static messages for cheap propagation in hot paths.  A rejected
/// request leaves the previously active request in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Request value is not finite")]
    NonFinite,

    #[error("Feedforward term is not finite")]
    NonFiniteFeedforward,

    #[error("Follower cannot target its own device id {0}")]
    SelfFollow(u8),
}
