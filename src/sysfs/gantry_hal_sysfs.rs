use std::rc::Rc;

use log::info;

use crate::config::ControllerConfig;
use crate::gantry_hal::{GantryHal, HalResult, LinePair, ThreadDelay, TouchPad};
use crate::sysfs::gpio_line::SysfsGpioLine;
use crate::sysfs::i2c_bus::LinuxI2cBus;
use crate::sysfs::iio_touch_pad::IioTouchPad;
use crate::sysfs::pwm_channel::{enable_pwm, PwmPort};
use crate::touch_sampler::TouchSensor;

/// Where everything is wired.  `(a, b)` line pairs drive the motor forward when `a` is high.
pub struct SysfsPortSpec {
    pub x_lines: (u32, u32),
    pub y_lines: (u32, u32),
    pub z_lines: (u32, u32),
    pub motor_power: [PwmPort; 3],
    pub touch_device: String,
    /// Indexed by [TouchSensor::index].
    pub touch_channels: [u32; TouchSensor::COUNT],
    pub i2c_bus: String,
}

impl Default for SysfsPortSpec {
    fn default() -> Self {
        Self {
            x_lines: (12, 13),
            y_lines: (14, 27),
            z_lines: (26, 25),
            motor_power: [
                PwmPort { chip: 0, channel: 0 },
                PwmPort { chip: 0, channel: 1 },
                PwmPort { chip: 0, channel: 2 },
            ],
            touch_device: "iio:device0".to_owned(),
            touch_channels: [0, 2, 8, 9, 3],
            i2c_bus: "/dev/i2c-0".to_owned(),
        }
    }
}

pub fn create_sysfs_hal(ports: &SysfsPortSpec, config: &ControllerConfig) -> HalResult<GantryHal> {
    info!("Bringing up sysfs hardware...");
    for port in ports.motor_power {
        enable_pwm(port, config.motor_pwm_frequency_hz, config.motor_pwm_duty)?;
    }

    let touch_pads = ports.touch_channels.map(|channel| {
        Box::new(IioTouchPad::new(&ports.touch_device, channel)) as Box<dyn TouchPad>
    });

    Ok(GantryHal {
        x_lines: open_pair(ports.x_lines)?,
        y_lines: open_pair(ports.y_lines)?,
        z_lines: open_pair(ports.z_lines)?,
        touch_pads,
        servo_bus: Box::new(LinuxI2cBus::open(&ports.i2c_bus, config.servo_address)?),
        delay: Rc::new(ThreadDelay),
    })
}

fn open_pair((a, b): (u32, u32)) -> HalResult<LinePair> {
    Ok(LinePair {
        a: Box::new(SysfsGpioLine::open_output(a)?),
        b: Box::new(SysfsGpioLine::open_output(b)?),
    })
}
