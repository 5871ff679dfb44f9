//! Blocking grab/release gestures for the Z axis and the claw servo.
//!
//! Each gesture runs to completion before returning, so nothing else on the gantry moves while
//! it runs.  If a step fails the Z motor is stopped before the error is returned; the claw is
//! left wherever it was.

use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use log::{error, info};

use crate::config::GripperConfig;
use crate::gantry_hal::Delay;
use crate::motor::Motor;
use crate::servo_driver::Pca9685;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum GripperState {
    Idle,
    Lowering,
    Closing,
    Raising,
    Neutral,
    ReleaseLowering,
    Opening,
    ReleaseNeutral,
}

impl GripperState {
    fn describe(self) -> &'static str {
        match self {
            GripperState::Idle => "Claw idle",
            GripperState::Lowering => "Lowering Z Axis (anticlockwise)",
            GripperState::Closing => "Closing Claw",
            GripperState::Raising => "Raising Z Axis (clockwise)",
            GripperState::Neutral => "Neutral Claw",
            GripperState::ReleaseLowering => "Lowering Z Axis to release",
            GripperState::Opening => "Opening Claw",
            GripperState::ReleaseNeutral => "Neutral Claw after release",
        }
    }
}

#[derive(Debug, Copy, Clone)]
enum StepAction {
    DriveZ { down: bool, duration: Duration },
    SetClaw { angle: u16, hold: Duration },
}

#[derive(Debug, Copy, Clone)]
struct Step {
    state: GripperState,
    action: StepAction,
}

pub struct GripperSequencer {
    z_motor: Motor,
    servo: Pca9685,
    claw_channel: u8,
    delay: Rc<dyn Delay>,
    config: GripperConfig,
    state: GripperState,
    visited: Vec<GripperState>,
}

impl GripperSequencer {
    pub fn new(
        z_motor: Motor,
        servo: Pca9685,
        claw_channel: u8,
        delay: Rc<dyn Delay>,
        config: GripperConfig,
    ) -> Self {
        Self {
            z_motor,
            servo,
            claw_channel,
            delay,
            config,
            state: GripperState::Idle,
            visited: Vec::new(),
        }
    }

    pub fn state(&self) -> GripperState {
        self.state
    }

    /// States entered since the last grab began, in order.
    pub fn visited(&self) -> &[GripperState] {
        &self.visited
    }

    /// The full gesture triggered by one touch: grab, pause, release.
    pub fn cycle(&mut self) -> anyhow::Result<()> {
        self.grab()?;
        self.delay.delay(Duration::from_millis(self.config.grab_release_pause_ms));
        self.release()
    }

    pub fn grab(&mut self) -> anyhow::Result<()> {
        self.visited.clear();
        let c = &self.config;
        let steps = [
            Step {
                state: GripperState::Lowering,
                action: StepAction::DriveZ { down: true, duration: millis(c.lower_ms) },
            },
            Step {
                state: GripperState::Closing,
                action: StepAction::SetClaw { angle: c.close_angle, hold: millis(c.close_hold_ms) },
            },
            Step {
                state: GripperState::Raising,
                action: StepAction::DriveZ { down: false, duration: millis(c.raise_ms) },
            },
            Step {
                state: GripperState::Neutral,
                action: StepAction::SetClaw { angle: c.neutral_angle, hold: millis(c.neutral_hold_ms) },
            },
        ];
        self.run(&steps)
    }

    pub fn release(&mut self) -> anyhow::Result<()> {
        let c = &self.config;
        let steps = [
            Step {
                state: GripperState::ReleaseLowering,
                action: StepAction::DriveZ { down: true, duration: millis(c.release_lower_ms) },
            },
            Step {
                state: GripperState::Opening,
                action: StepAction::SetClaw { angle: c.open_angle, hold: millis(c.open_hold_ms) },
            },
            Step {
                state: GripperState::ReleaseNeutral,
                action: StepAction::SetClaw {
                    angle: c.neutral_angle,
                    hold: millis(c.release_neutral_hold_ms),
                },
            },
        ];
        self.run(&steps)
    }

    fn run(&mut self, steps: &[Step]) -> anyhow::Result<()> {
        let result = steps.iter().try_for_each(|step| self.run_step(*step));
        if let Err(e) = &result {
            error!("Gripper failed in {:?}: {e:#}", self.state);
            self.abort();
        }
        self.state = GripperState::Idle;
        info!("→ {}", self.state.describe());
        result
    }

    fn run_step(&mut self, step: Step) -> anyhow::Result<()> {
        self.state = step.state;
        self.visited.push(step.state);
        info!("→ {}", step.state.describe());
        match step.action {
            StepAction::DriveZ { down, duration } => {
                self.z_motor.drive(down)
                    .with_context(|| format!("driving Z axis in {:?}", step.state))?;
                self.delay.delay(duration);
                self.z_motor.stop()
                    .with_context(|| format!("stopping Z axis in {:?}", step.state))?;
            }
            StepAction::SetClaw { angle, hold } => {
                self.servo.set_angle(self.claw_channel, angle)
                    .with_context(|| format!("moving claw to {angle} in {:?}", step.state))?;
                self.delay.delay(hold);
            }
        }
        Ok(())
    }

    fn abort(&mut self) {
        if let Err(e) = self.z_motor.stop() {
            error!("Could not stop Z axis while aborting: {e}");
        }
    }
}

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
