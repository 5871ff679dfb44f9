use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::servo_driver;
use crate::touch_sampler::DEFAULT_FAULT_READING;

/// Full scale of the motor power PWM duty value.
pub const MOTOR_PWM_DUTY_RESOLUTION: u16 = 1023;

/// Durations and claw angles of the grab and release gestures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GripperConfig {
    pub lower_ms: u64,
    pub close_angle: u16,
    pub close_hold_ms: u64,
    pub raise_ms: u64,
    pub neutral_angle: u16,
    pub neutral_hold_ms: u64,
    pub grab_release_pause_ms: u64,
    pub release_lower_ms: u64,
    pub open_angle: u16,
    pub open_hold_ms: u64,
    pub release_neutral_hold_ms: u64,
}

impl Default for GripperConfig {
    fn default() -> Self {
        Self {
            lower_ms: 2500,
            close_angle: 0,
            close_hold_ms: 200,
            raise_ms: 2500,
            neutral_angle: 90,
            neutral_hold_ms: 100,
            grab_release_pause_ms: 400,
            release_lower_ms: 500,
            open_angle: 180,
            open_hold_ms: 300,
            release_neutral_hold_ms: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// A pad is touched when its reading is strictly below this.
    pub threshold: u16,
    pub tick_interval_ms: u64,
    pub fault_reading: u16,
    pub servo_address: u16,
    pub servo_frequency_hz: u32,
    pub claw_channel: u8,
    pub motor_pwm_frequency_hz: u32,
    /// Out of [MOTOR_PWM_DUTY_RESOLUTION].
    pub motor_pwm_duty: u16,
    pub gripper: GripperConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            threshold: 200,
            tick_interval_ms: 50,
            fault_reading: DEFAULT_FAULT_READING,
            servo_address: 0x40,
            servo_frequency_hz: 50,
            claw_channel: 0,
            motor_pwm_frequency_hz: 700,
            motor_pwm_duty: 700,
            gripper: GripperConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Reads a JSON config, any missing field taking its default.  No path means all defaults.
    pub fn load(path: Option<impl AsRef<Path>>) -> anyhow::Result<Self> {
        let config: ControllerConfig = match path {
            Some(path) => {
                let path = path.as_ref();
                let file = File::open(path)
                    .with_context(|| format!("opening config {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => ControllerConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        servo_driver::prescale_for(self.servo_frequency_hz)?;
        if self.claw_channel >= servo_driver::CHANNEL_COUNT {
            return Err(anyhow!("claw_channel {} out of range", self.claw_channel));
        }
        if self.motor_pwm_frequency_hz == 0 {
            return Err(anyhow!("motor_pwm_frequency_hz must be non-zero"));
        }
        if self.motor_pwm_duty > MOTOR_PWM_DUTY_RESOLUTION {
            return Err(anyhow!(
                "motor_pwm_duty {} exceeds {MOTOR_PWM_DUTY_RESOLUTION}", self.motor_pwm_duty));
        }
        let g = &self.gripper;
        for angle in [g.close_angle, g.neutral_angle, g.open_angle] {
            servo_driver::pulse_for_angle(angle)?;
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
