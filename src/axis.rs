use derive_new::new;
use log::info;

use crate::gantry_hal::HalResult;
use crate::motor::{Motor, MotorCommand};
use crate::touch_sampler::{TouchReadings, TouchSensor};

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum AxisId {
    X,
    Y,
    Z,
}

/// Maps the two touch flags of an axis to a motor command.  Clockwise wins when both are
/// touched.
pub fn resolve_command(cw_triggered: bool, ccw_triggered: bool) -> MotorCommand {
    if cw_triggered {
        MotorCommand::Forward
    } else if ccw_triggered {
        MotorCommand::Reverse
    } else {
        MotorCommand::Stop
    }
}

/// One bidirectional axis: a motor plus the pair of touch pads that steer it.
#[derive(new)]
pub struct AxisController {
    id: AxisId,
    motor: Motor,
    cw_sensor: TouchSensor,
    ccw_sensor: TouchSensor,
}

impl AxisController {
    pub fn id(&self) -> AxisId {
        self.id
    }

    pub fn command(&self) -> MotorCommand {
        self.motor.command()
    }

    pub fn update_from(&mut self, readings: &TouchReadings, threshold: u16) -> HalResult<MotorCommand> {
        self.update(
            readings.is_triggered(self.cw_sensor, threshold),
            readings.is_triggered(self.ccw_sensor, threshold))
    }

    /// Re-applied every tick even if unchanged; only a change is reported.
    pub fn update(&mut self, cw_triggered: bool, ccw_triggered: bool) -> HalResult<MotorCommand> {
        let command = resolve_command(cw_triggered, ccw_triggered);
        if command != self.motor.command() {
            match command {
                MotorCommand::Forward => info!("→ {:?} Clockwise", self.id),
                MotorCommand::Reverse => info!("→ {:?} AntiClockwise", self.id),
                MotorCommand::Stop => info!("→ {:?} Stop", self.id),
            }
        }
        self.motor.apply(command)?;
        Ok(command)
    }

    pub fn stop(&mut self) -> HalResult<()> {
        self.motor.stop()
    }
}
