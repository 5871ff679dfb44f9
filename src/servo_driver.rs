//! Client for a PCA9685-style 16 channel PWM controller reached over a register bus.
//!
//! The controller runs a 4096-step PWM cycle off a 25 MHz reference clock.  Each channel has a
//! block of four registers holding the little-endian "on" and "off" tick counts.

use std::rc::Rc;
use std::time::Duration;

use log::debug;
use thiserror::Error;

use crate::gantry_hal::{Delay, HalError, RegisterBus};

pub mod reg {
    pub const MODE1: u8 = 0x00;
    pub const CHANNEL0_ON_L: u8 = 0x06;
    pub const PRESCALE: u8 = 0xFE;
}

const MODE1_SLEEP: u8 = 0x10;
/// Masked off while entering sleep: writing a 1 here restarts PWM, which must wait until the new
/// prescale is loaded.
const MODE1_RESTART: u8 = 0x80;
const MODE1_RESTART_AUTO_INCREMENT: u8 = 0xA1;

const REFERENCE_CLOCK_HZ: u64 = 25_000_000;
const PWM_STEPS: u64 = 4096;
const PRESCALE_MIN: u64 = 3;
const PRESCALE_MAX: u64 = 255;
const OSCILLATOR_SETTLE_TIME: Duration = Duration::from_millis(5);

pub const CHANNEL_COUNT: u8 = 16;
pub const MAX_TICK: u16 = 4095;
pub const MAX_ANGLE: u16 = 180;
pub const PULSE_AT_MIN_ANGLE: u16 = 102;
pub const PULSE_AT_MAX_ANGLE: u16 = 512;

#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum ServoError {
    #[error("servo bus fault: {0}")]
    Bus(#[from] HalError),
    #[error("angle {0} outside of 0..=180")]
    AngleOutOfRange(u16),
    #[error("cannot run the PWM cycle at {0} Hz")]
    InvalidFrequency(u32),
    #[error("no such channel: {0}")]
    InvalidChannel(u8),
    #[error("tick {0} outside of 0..=4095")]
    TickOutOfRange(u16),
}

pub type ServoResult<T> = Result<T, ServoError>;

/// `floor(25 MHz / (4096 * freq) - 1)`, rejected if the device can't represent it.
pub fn prescale_for(frequency_hz: u32) -> ServoResult<u8> {
    if frequency_hz == 0 {
        return Err(ServoError::InvalidFrequency(frequency_hz));
    }
    let cycles = REFERENCE_CLOCK_HZ / (PWM_STEPS * u64::from(frequency_hz));
    match cycles.checked_sub(1) {
        Some(prescale) if (PRESCALE_MIN..=PRESCALE_MAX).contains(&prescale) => Ok(prescale as u8),
        _ => Err(ServoError::InvalidFrequency(frequency_hz)),
    }
}

/// Linear map of 0..=180 degrees onto the 102..=512 "off" tick range, rounded to nearest.
pub fn pulse_for_angle(angle_degrees: u16) -> ServoResult<u16> {
    if angle_degrees > MAX_ANGLE {
        return Err(ServoError::AngleOutOfRange(angle_degrees));
    }
    let span = u32::from(PULSE_AT_MAX_ANGLE - PULSE_AT_MIN_ANGLE);
    let max = u32::from(MAX_ANGLE);
    let offset = (span * u32::from(angle_degrees) + max / 2) / max;
    Ok(PULSE_AT_MIN_ANGLE + offset as u16)
}

pub struct Pca9685 {
    bus: Box<dyn RegisterBus>,
    delay: Rc<dyn Delay>,
}

impl Pca9685 {
    /// Resets the mode register and programs the frame rate.  Any bus error aborts
    /// initialization.
    pub fn initialize(
        bus: Box<dyn RegisterBus>,
        delay: Rc<dyn Delay>,
        frequency_hz: u32,
    ) -> ServoResult<Self> {
        let mut me = Self { bus, delay };
        me.bus.write_registers(reg::MODE1, &[0x00])?;
        me.set_pwm_frequency(frequency_hz)?;
        Ok(me)
    }

    pub fn set_pwm_frequency(&mut self, frequency_hz: u32) -> ServoResult<()> {
        let prescale = prescale_for(frequency_hz)?;
        debug!("set_pwm_frequency: {frequency_hz} Hz, prescale={prescale}");

        // Prescale is only writable while the oscillator is asleep.
        let old_mode = self.bus.read_register(reg::MODE1)?;
        self.bus.write_registers(reg::MODE1, &[(old_mode & !MODE1_RESTART) | MODE1_SLEEP])?;
        self.bus.write_registers(reg::PRESCALE, &[prescale])?;
        self.bus.write_registers(reg::MODE1, &[old_mode])?;
        self.delay.delay(OSCILLATOR_SETTLE_TIME);
        self.bus.write_registers(reg::MODE1, &[old_mode | MODE1_RESTART_AUTO_INCREMENT])?;
        Ok(())
    }

    pub fn set_pulse(&mut self, channel: u8, on_tick: u16, off_tick: u16) -> ServoResult<()> {
        if channel >= CHANNEL_COUNT {
            return Err(ServoError::InvalidChannel(channel));
        }
        for tick in [on_tick, off_tick] {
            if tick > MAX_TICK {
                return Err(ServoError::TickOutOfRange(tick));
            }
        }
        let [on_lo, on_hi] = on_tick.to_le_bytes();
        let [off_lo, off_hi] = off_tick.to_le_bytes();
        let register = reg::CHANNEL0_ON_L + 4 * channel;
        self.bus.write_registers(register, &[on_lo, on_hi, off_lo, off_hi])?;
        Ok(())
    }

    /// Out-of-range angles are rejected before anything reaches the bus.
    pub fn set_angle(&mut self, channel: u8, angle_degrees: u16) -> ServoResult<()> {
        let pulse = pulse_for_angle(angle_degrees)?;
        debug!("set_angle: channel={channel}, angle={angle_degrees}, pulse={pulse}");
        self.set_pulse(channel, 0, pulse)
    }
}
