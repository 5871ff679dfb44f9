use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

use crate::touch_sampler::TouchSensor;

#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum HalError {
    #[error("{0}")]
    DeviceNotConnected(String),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    InternalError(String),
}

impl From<std::io::Error> for HalError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => HalError::DeviceNotConnected(e.to_string()),
            _ => HalError::Io(e.to_string()),
        }
    }
}

pub type HalResult<T> = Result<T, HalError>;

/// A single digital output, e.g. one direction input of an H-bridge.
pub trait OutputLine {
    fn set_high(&mut self) -> HalResult<()>;
    fn set_low(&mut self) -> HalResult<()>;
}

/// Capacitive touch input.  Lower raw values mean a stronger touch.
pub trait TouchPad {
    fn read(&mut self) -> HalResult<u16>;
}

/// Byte-oriented register access to a device at a fixed bus address.
pub trait RegisterBus {
    fn read_register(&mut self, register: u8) -> HalResult<u8>;
    fn write_registers(&mut self, register: u8, data: &[u8]) -> HalResult<()>;
}

pub trait Delay {
    fn delay(&self, duration: Duration);
}

/// Real wall-clock delay; blocks the whole process.
#[derive(Debug, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// The two direction lines of one DC motor, `a` high meaning forward.
pub struct LinePair {
    pub a: Box<dyn OutputLine>,
    pub b: Box<dyn OutputLine>,
}

/// Everything the controller touches on the hardware side, built once at startup.
pub struct GantryHal {
    pub x_lines: LinePair,
    pub y_lines: LinePair,
    pub z_lines: LinePair,
    /// Indexed by [TouchSensor::index].
    pub touch_pads: [Box<dyn TouchPad>; TouchSensor::COUNT],
    pub servo_bus: Box<dyn RegisterBus>,
    pub delay: Rc<dyn Delay>,
}
