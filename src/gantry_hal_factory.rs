use std::path::Path;
use std::rc::Rc;

use log::info;

use crate::config::ControllerConfig;
use crate::gantry_hal::{GantryHal, ThreadDelay};
use crate::gantry_hal_mock::GantryHalMock;
use crate::sysfs::gantry_hal_sysfs::{create_sysfs_hal, SysfsPortSpec};

pub struct GantryHalFactory {
    force_mock: bool,
}

impl GantryHalFactory {
    pub fn new_maybe_mock(force_mock: bool) -> Self {
        Self { force_mock }
    }

    /// The mock keeps real timing and no journal, so a fake-hardware run paces like the real
    /// thing and can run indefinitely.
    pub fn create_hal(&self, config: &ControllerConfig) -> anyhow::Result<GantryHal> {
        if !self.force_mock && Path::new("/sys/class/gpio").exists() {
            Ok(create_sysfs_hal(&SysfsPortSpec::default(), config)?)
        } else {
            info!("Using mock hardware");
            Ok(GantryHalMock::without_journal().create_hal_with_delay(Rc::new(ThreadDelay)))
        }
    }
}
