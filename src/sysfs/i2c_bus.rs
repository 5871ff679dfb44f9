use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};

use crate::gantry_hal::{HalError, HalResult, RegisterBus};

pub struct LinuxI2cBus {
    device: LinuxI2CDevice,
}

impl LinuxI2cBus {
    pub fn open(path: &str, address: u16) -> HalResult<Self> {
        let device = LinuxI2CDevice::new(path, address).map_err(|e| {
            HalError::DeviceNotConnected(format!("no device at 0x{address:02x} on {path}: {e}"))
        })?;
        Ok(Self { device })
    }
}

impl RegisterBus for LinuxI2cBus {
    fn read_register(&mut self, register: u8) -> HalResult<u8> {
        Ok(self.device.smbus_read_byte_data(register)?)
    }

    fn write_registers(&mut self, register: u8, data: &[u8]) -> HalResult<()> {
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.push(register);
        frame.extend_from_slice(data);
        self.device.write(&frame)?;
        Ok(())
    }
}

impl From<LinuxI2CError> for HalError {
    fn from(e: LinuxI2CError) -> Self {
        HalError::Io(e.to_string())
    }
}
