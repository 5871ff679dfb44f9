use std::fs;
use std::path::PathBuf;

use crate::gantry_hal::{HalError, HalResult, TouchPad};

/// Capacitive pad exposed as a raw IIO channel.
pub struct IioTouchPad {
    raw_path: PathBuf,
}

impl IioTouchPad {
    pub fn new(device: &str, channel: u32) -> Self {
        let raw_path = PathBuf::from("/sys/bus/iio/devices")
            .join(device)
            .join(format!("in_voltage{channel}_raw"));
        Self { raw_path }
    }
}

impl TouchPad for IioTouchPad {
    fn read(&mut self) -> HalResult<u16> {
        let raw = fs::read_to_string(&self.raw_path)?;
        raw.trim().parse::<u16>().map_err(|e| {
            HalError::InternalError(format!("bad reading {:?} from {}: {e}", raw.trim(), self.raw_path.display()))
        })
    }
}
