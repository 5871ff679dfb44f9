use std::fs;
use std::path::PathBuf;

use log::debug;

use crate::config::MOTOR_PWM_DUTY_RESOLUTION;
use crate::gantry_hal::{HalError, HalResult};

const NANOS_PER_SEC: u64 = 1_000_000_000;

#[derive(Debug, Copy, Clone)]
pub struct PwmPort {
    pub chip: u32,
    pub channel: u32,
}

/// Starts a free-running PWM output and leaves it running; used for the fixed motor power duty.
pub fn enable_pwm(port: PwmPort, frequency_hz: u32, duty: u16) -> HalResult<()> {
    if frequency_hz == 0 {
        return Err(HalError::InternalError("PWM frequency must be non-zero".to_owned()));
    }
    let chip_dir = PathBuf::from("/sys/class/pwm").join(format!("pwmchip{}", port.chip));
    let channel_dir = chip_dir.join(format!("pwm{}", port.channel));
    if !channel_dir.exists() {
        fs::write(chip_dir.join("export"), port.channel.to_string())?;
    }

    let period_ns = NANOS_PER_SEC / u64::from(frequency_hz);
    let duty_ns = period_ns * u64::from(duty.min(MOTOR_PWM_DUTY_RESOLUTION))
        / u64::from(MOTOR_PWM_DUTY_RESOLUTION);
    debug!("enable_pwm: {port:?} period={period_ns}ns duty={duty_ns}ns");

    // Duty may never exceed the period, so shrink it before touching the period.
    fs::write(channel_dir.join("duty_cycle"), "0")?;
    fs::write(channel_dir.join("period"), period_ns.to_string())?;
    fs::write(channel_dir.join("duty_cycle"), duty_ns.to_string())?;
    fs::write(channel_dir.join("enable"), "1")?;
    Ok(())
}
