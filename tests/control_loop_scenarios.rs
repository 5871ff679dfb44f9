use std::time::Duration;

use touch_claw::axis::AxisId;
use touch_claw::config::ControllerConfig;
use touch_claw::control_loop::{ControlLoop, TickCommands};
use touch_claw::gantry_hal_mock::{DirectionPin, GantryHalMock, HardwareEvent, LineId};
use touch_claw::gripper::GripperState;
use touch_claw::motor::MotorCommand;
use touch_claw::touch_sampler::TouchSensor;

fn set_readings(mock: &GantryHalMock, readings: &[(&str, u16)]) {
    for (name, value) in readings {
        let sensor = TouchSensor::from_name(name).unwrap();
        mock.set_touch(sensor, Ok(*value));
    }
}

fn start(mock: &GantryHalMock) -> ControlLoop {
    let control = ControlLoop::new(mock.create_hal(), &ControllerConfig::default()).unwrap();
    mock.clear_events();
    control
}

#[test]
fn x_clockwise_touch_drives_only_x() {
    let mock = GantryHalMock::new();
    let mut control = start(&mock);
    set_readings(&mock, &[("x_cw", 50), ("x_ccw", 999), ("y_cw", 999), ("y_ccw", 999), ("grab", 999)]);

    let commands = control.tick().unwrap();

    assert_eq!(commands, TickCommands { x: MotorCommand::Forward, y: MotorCommand::Stop, grab: false });
    assert!(mock.is_high(LineId::new(AxisId::X, DirectionPin::A)));
    assert!(!mock.is_high(LineId::new(AxisId::X, DirectionPin::B)));
    assert!(!mock.is_high(LineId::new(AxisId::Y, DirectionPin::A)));
    assert!(!mock.is_high(LineId::new(AxisId::Y, DirectionPin::B)));
    assert_eq!(control.gripper().state(), GripperState::Idle);
    assert!(!mock.events().iter().any(|e| matches!(e, HardwareEvent::Registers { .. })));
}

#[test]
fn grab_touch_runs_full_gesture_then_resumes() {
    let mock = GantryHalMock::new();
    let mut control = start(&mock);
    set_readings(&mock, &[("x_cw", 999), ("x_ccw", 999), ("y_cw", 999), ("y_ccw", 999), ("grab", 10)]);

    let commands = control.tick().unwrap();
    assert!(commands.grab);
    assert_eq!(control.gripper().visited(), &[
        GripperState::Lowering,
        GripperState::Closing,
        GripperState::Raising,
        GripperState::Neutral,
        GripperState::ReleaseLowering,
        GripperState::Opening,
        GripperState::ReleaseNeutral,
    ]);

    // Gesture delays, then the tick interval once the gesture is over.
    let delays: Vec<u128> = mock.events().into_iter()
        .filter_map(|e| match e {
            HardwareEvent::Delay(d) => Some(d.as_millis()),
            _ => None,
        })
        .collect();
    assert_eq!(delays, vec![2500, 200, 2500, 100, 400, 500, 300, 200, 50]);

    set_readings(&mock, &[("grab", 999)]);
    mock.clear_events();
    let commands = control.tick().unwrap();
    assert!(!commands.grab);
    assert_eq!(mock.events().last(), Some(&HardwareEvent::Delay(Duration::from_millis(50))));
    assert_eq!(control.ticks(), 2);
    assert_eq!(mock.both_high_violations(), 0);
}

#[test]
fn axis_touches_are_applied_before_the_gesture() {
    let mock = GantryHalMock::new();
    let mut control = start(&mock);
    set_readings(&mock, &[("x_cw", 999), ("x_ccw", 20), ("y_cw", 999), ("y_ccw", 999), ("grab", 10)]);

    control.tick().unwrap();

    let events = mock.events();
    let x_reverse = events.iter()
        .position(|e| *e == HardwareEvent::Line { line: LineId::new(AxisId::X, DirectionPin::B), high: true })
        .unwrap();
    let first_z = events.iter()
        .position(|e| matches!(e, HardwareEvent::Line { line, high: true } if line.axis == AxisId::Z))
        .unwrap();
    assert!(x_reverse < first_z);
    // X keeps running through the gesture; it is only re-evaluated on the next tick.
    assert!(mock.is_high(LineId::new(AxisId::X, DirectionPin::B)));
}
