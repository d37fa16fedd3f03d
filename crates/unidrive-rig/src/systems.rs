//! Bevy systems for the control cycle.

use bevy::prelude::*;

use crate::components::{MotorChannel, MotorCommand, RangeChannel};

/// Drains each [`MotorCommand`] inbox into its driver.
///
/// Runs in [`RigSet::Command`](crate::RigSet::Command), before any
/// refresh.  A rejected request is logged and dropped; the driver keeps
/// its previously active request.
pub fn apply_motor_commands(mut query: Query<(&mut MotorChannel, &mut MotorCommand)>) {
    for (mut channel, mut command) in &mut query {
        if let Some(request) = command.take() {
            if let Err(err) = channel.driver.set_control(request) {
                tracing::warn!(
                    device = %channel.driver.id(),
                    error = %err,
                    "rejected control request dropped"
                );
            }
        }
    }
}

/// Refreshes every motor driver's snapshot.
///
/// Runs in [`RigSet::Refresh`](crate::RigSet::Refresh).
pub fn refresh_motors(mut query: Query<&mut MotorChannel>) {
    for mut channel in &mut query {
        channel.driver.update_inputs();
    }
}

/// Refreshes every range sensor's snapshot.
///
/// Runs in [`RigSet::Refresh`](crate::RigSet::Refresh).
pub fn refresh_ranges(mut query: Query<&mut RangeChannel>) {
    for mut channel in &mut query {
        channel.sensor.update_inputs();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnidriveRigPlugin;

    use unidrive_core::prelude::*;
    use unidrive_motor::backend::NativeRequest;
    use unidrive_motor::prelude::*;
    use unidrive_range::bus::RangeFrame;
    use unidrive_range::prelude::*;
    use unidrive_test_utils::prelude::*;

    fn sim_channel(clock: &StepTime) -> MotorChannel {
        let motor = SimMotor::new(presets::motors::kraken_x60(), 0.002, GearRatio::DIRECT)
            .expect("valid physical model");
        MotorChannel::new(MotorDriver::sim(DeviceId(1), motor).with_time_source(clock.clone()))
    }

    #[test]
    fn command_is_applied_before_refresh_in_the_same_frame() {
        let mut app = App::new();
        app.add_plugins(UnidriveRigPlugin);

        let clock = StepTime::new();
        let mut command = MotorCommand::default();
        command.set(ControlRequest::voltage(3.0));
        let entity = app.world_mut().spawn((sim_channel(&clock), command)).id();

        app.finish();
        app.cleanup();
        clock.advance_secs(0.02);
        app.update();

        let channel = app.world().get::<MotorChannel>(entity).unwrap();
        // Voltage took effect in this cycle: the sim integrated it.
        assert!(channel.driver.inputs().velocity_rad_per_sec > 0.0);
        let command = app.world().get::<MotorCommand>(entity).unwrap();
        assert!(!command.is_pending());
    }

    #[test]
    fn motor_keeps_integrating_across_frames() {
        let mut app = App::new();
        app.add_plugins(UnidriveRigPlugin);

        let clock = StepTime::new();
        let mut command = MotorCommand::default();
        command.set(ControlRequest::voltage(3.0));
        let entity = app.world_mut().spawn((sim_channel(&clock), command)).id();

        app.finish();
        app.cleanup();

        clock.advance_secs(0.02);
        app.update();
        let first = app
            .world()
            .get::<MotorChannel>(entity)
            .unwrap()
            .driver
            .inputs()
            .velocity_rad_per_sec;

        clock.advance_secs(0.02);
        app.update();
        let second = app
            .world()
            .get::<MotorChannel>(entity)
            .unwrap()
            .driver
            .inputs()
            .velocity_rad_per_sec;

        assert!(second > first);
    }

    #[test]
    fn rejected_command_is_dropped_without_panicking() {
        let mut app = App::new();
        app.add_plugins(UnidriveRigPlugin);

        let clock = StepTime::new();
        let mut command = MotorCommand::default();
        command.set(ControlRequest::voltage(f32::NAN));
        let entity = app.world_mut().spawn((sim_channel(&clock), command)).id();

        app.finish();
        app.cleanup();
        app.update();

        let channel = app.world().get::<MotorChannel>(entity).unwrap();
        assert_eq!(
            channel.driver.active_request(),
            ControlRequest::voltage(0.0)
        );
    }

    #[test]
    fn real_channel_round_trips_through_scripted_bus() {
        let mut app = App::new();
        app.add_plugins(UnidriveRigPlugin);

        let bus = ScriptedMotorBus::new();
        bus.set_frame(MotorFrame {
            rotor_rotations: 2.0,
            ..MotorFrame::default()
        });
        let driver = MotorDriver::real(DeviceId(5), bus.clone(), GearRatio::DIRECT);
        let mut command = MotorCommand::default();
        command.set(ControlRequest::voltage(6.0));
        let entity = app
            .world_mut()
            .spawn((MotorChannel::new(driver), command))
            .id();

        app.finish();
        app.cleanup();
        app.update();

        assert_eq!(bus.last_write(), Some(NativeRequest::Voltage { volts: 6.0 }));
        let channel = app.world().get::<MotorChannel>(entity).unwrap();
        assert!(channel.driver.inputs().position_rads > 0.0);
    }

    #[test]
    fn range_channel_refreshes_each_frame() {
        let mut app = App::new();
        app.add_plugins(UnidriveRigPlugin);

        let flag = DetectFlag::new();
        let sensor = RangeSensor::sim(DeviceId(20), SimRange::new(flag.clone()));
        let entity = app.world_mut().spawn(RangeChannel::new(sensor)).id();

        app.finish();
        app.cleanup();

        flag.set(true);
        app.update();
        assert!(app
            .world()
            .get::<RangeChannel>(entity)
            .unwrap()
            .sensor
            .is_in_range());

        flag.set(false);
        app.update();
        assert!(!app
            .world()
            .get::<RangeChannel>(entity)
            .unwrap()
            .sensor
            .is_in_range());
    }

    #[test]
    fn scripted_range_fault_keeps_stale_reading() {
        let mut app = App::new();
        app.add_plugins(UnidriveRigPlugin);

        let bus = ScriptedRangeBus::new();
        bus.set_frame(RangeFrame {
            distance_meters: 0.3,
            is_detecting: true,
        });
        let entity = app
            .world_mut()
            .spawn(RangeChannel::new(RangeSensor::real(DeviceId(21), bus.clone())))
            .id();

        app.finish();
        app.cleanup();
        app.update();

        bus.fail_reads(true);
        app.update();

        let channel = app.world().get::<RangeChannel>(entity).unwrap();
        assert!(channel.sensor.is_in_range());
        assert_eq!(channel.sensor.bus_faults(), 1);
    }

    #[test]
    fn entities_without_command_inbox_are_still_refreshed() {
        let mut app = App::new();
        app.add_plugins(UnidriveRigPlugin);

        let clock = StepTime::new();
        // No MotorCommand: refresh must not require one.
        let entity = app.world_mut().spawn(sim_channel(&clock)).id();

        app.finish();
        app.cleanup();
        clock.advance_secs(0.02);
        app.update();

        let channel = app.world().get::<MotorChannel>(entity).unwrap();
        // At rest with a zero request: refreshed, still at rest.
        assert!(channel.driver.inputs().velocity_rad_per_sec.abs() < f32::EPSILON);
    }
}
