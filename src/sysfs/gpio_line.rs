use std::fs;
use std::path::PathBuf;

use crate::gantry_hal::{HalResult, OutputLine};

const GPIO_ROOT: &str = "/sys/class/gpio";

pub struct SysfsGpioLine {
    value_path: PathBuf,
}

impl SysfsGpioLine {
    /// Exports the pin if needed and configures it as an output driven low.
    pub fn open_output(pin: u32) -> HalResult<Self> {
        let pin_dir = PathBuf::from(GPIO_ROOT).join(format!("gpio{pin}"));
        if !pin_dir.exists() {
            fs::write(PathBuf::from(GPIO_ROOT).join("export"), pin.to_string())?;
        }
        // "low" sets the direction and the initial level in one write.
        fs::write(pin_dir.join("direction"), "low")?;
        Ok(Self { value_path: pin_dir.join("value") })
    }
}

impl OutputLine for SysfsGpioLine {
    fn set_high(&mut self) -> HalResult<()> {
        fs::write(&self.value_path, "1")?;
        Ok(())
    }

    fn set_low(&mut self) -> HalResult<()> {
        fs::write(&self.value_path, "0")?;
        Ok(())
    }
}
