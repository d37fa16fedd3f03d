//! Bevy plugin running unidrive drivers and sensors on the control cycle.
//!
//! Add [`UnidriveRigPlugin`] to your Bevy app, then spawn entities with
//! channel components.  Each frame, pending commands are applied first,
//! then every driver and sensor refreshes its snapshot, so subsystem
//! logic downstream always reads data from the current cycle.
//!
//! # Example
//!
//! ```
//! use bevy::prelude::*;
//! use unidrive_core::prelude::*;
//! use unidrive_motor::prelude::*;
//! use unidrive_rig::prelude::*;
//!
//! let mut app = App::new();
//! app.add_plugins(UnidriveRigPlugin);
//!
//! let sim = SimMotor::new(presets::motors::kraken_x60(), 0.002, GearRatio::DIRECT)
//!     .expect("valid physical model");
//! app.world_mut().spawn((
//!     MotorChannel::new(MotorDriver::sim(DeviceId(1), sim)),
//!     MotorCommand::default(),
//! ));
//! ```

pub mod components;
pub mod systems;

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// RigSet
// ---------------------------------------------------------------------------

/// System-set ordering for one control cycle.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RigSet {
    /// Pending commands are written to the hardware.
    Command,
    /// Drivers and sensors refresh their snapshots.
    Refresh,
}

// ---------------------------------------------------------------------------
// UnidriveRigPlugin
// ---------------------------------------------------------------------------

/// Bevy plugin that runs the command/refresh cycle in [`Update`].
pub struct UnidriveRigPlugin;

impl Plugin for UnidriveRigPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(Update, (RigSet::Command, RigSet::Refresh).chain());
        app.add_systems(
            Update,
            (
                systems::apply_motor_commands.in_set(RigSet::Command),
                (systems::refresh_motors, systems::refresh_ranges).in_set(RigSet::Refresh),
            ),
        );
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        components::{MotorChannel, MotorCommand, RangeChannel},
        RigSet, UnidriveRigPlugin,
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
