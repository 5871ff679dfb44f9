use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use log::{error, info, trace};

use crate::axis::{AxisController, AxisId};
use crate::config::ControllerConfig;
use crate::gantry_hal::{Delay, GantryHal};
use crate::gripper::GripperSequencer;
use crate::motor::{Motor, MotorCommand};
use crate::servo_driver::Pca9685;
use crate::touch_sampler::{TouchReadings, TouchSampler, TouchSensor};

/// What a single tick decided.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct TickCommands {
    pub x: MotorCommand,
    pub y: MotorCommand,
    pub grab: bool,
}

pub struct ControlLoop {
    sampler: TouchSampler,
    x_axis: AxisController,
    y_axis: AxisController,
    gripper: GripperSequencer,
    delay: Rc<dyn Delay>,
    threshold: u16,
    tick_interval: Duration,
    ticks: u64,
}

impl ControlLoop {
    /// Takes ownership of the hardware and hands each component its share.  Fails if the
    /// servo driver can't be brought up.
    pub fn new(hal: GantryHal, config: &ControllerConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let GantryHal { x_lines, y_lines, z_lines, touch_pads, servo_bus, delay } = hal;

        let servo = Pca9685::initialize(servo_bus, delay.clone(), config.servo_frequency_hz)
            .context("initializing servo driver")?;
        let x_axis = AxisController::new(
            AxisId::X, Motor::new(x_lines)?, TouchSensor::XCw, TouchSensor::XCcw);
        let y_axis = AxisController::new(
            AxisId::Y, Motor::new(y_lines)?, TouchSensor::YCw, TouchSensor::YCcw);
        let gripper = GripperSequencer::new(
            Motor::new(z_lines)?,
            servo,
            config.claw_channel,
            delay.clone(),
            config.gripper.clone());

        info!("Touch-control claw ready. Threshold = {}", config.threshold);
        Ok(Self {
            sampler: TouchSampler::new(touch_pads, config.fault_reading),
            x_axis,
            y_axis,
            gripper,
            delay,
            threshold: config.threshold,
            tick_interval: config.tick_interval(),
            ticks: 0,
        })
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn gripper(&self) -> &GripperSequencer {
        &self.gripper
    }

    /// Runs until a fatal fault.
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.run_for(None)
    }

    pub fn run_for(&mut self, max_ticks: Option<u64>) -> anyhow::Result<()> {
        while max_ticks.map_or(true, |max| self.ticks < max) {
            if let Err(e) = self.tick() {
                error!("Fatal fault after {} ticks: {e:#}", self.ticks);
                self.halt();
                return Err(e);
            }
        }
        Ok(())
    }

    /// Sample, steer X and Y, run a full grab/release if asked, then sleep one interval.
    pub fn tick(&mut self) -> anyhow::Result<TickCommands> {
        let readings = self.sampler.sample();
        let commands = self.dispatch(&readings)?;
        self.ticks += 1;
        trace!("tick {}: {commands:?}", self.ticks);
        self.delay.delay(self.tick_interval);
        Ok(commands)
    }

    /// One grab/release outside the tick loop, with X and Y held still.
    pub fn run_gripper_cycle(&mut self) -> anyhow::Result<()> {
        self.halt();
        self.gripper.cycle()
    }

    fn dispatch(&mut self, readings: &TouchReadings) -> anyhow::Result<TickCommands> {
        let x = self.x_axis.update_from(readings, self.threshold).context("driving X axis")?;
        let y = self.y_axis.update_from(readings, self.threshold).context("driving Y axis")?;
        let grab = readings.is_triggered(TouchSensor::Grab, self.threshold);
        if grab {
            info!("→ Claw Grab/Release Triggered");
            self.gripper.cycle()?;
        }
        Ok(TickCommands { x, y, grab })
    }

    fn halt(&mut self) {
        for axis in [&mut self.x_axis, &mut self.y_axis] {
            if let Err(e) = axis.stop() {
                error!("Could not stop {:?} axis: {e}", axis.id());
            }
        }
    }
}
