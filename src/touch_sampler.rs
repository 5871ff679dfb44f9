use log::{debug, warn};

use crate::gantry_hal::TouchPad;

/// Reading substituted for a pad that could not be read; always reads as "not touched".
pub const DEFAULT_FAULT_READING: u16 = 1000;

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum TouchSensor {
    XCw,
    XCcw,
    YCw,
    YCcw,
    Grab,
}

impl TouchSensor {
    pub const COUNT: usize = 5;

    pub const ALL: [TouchSensor; TouchSensor::COUNT] = [
        TouchSensor::XCw,
        TouchSensor::XCcw,
        TouchSensor::YCw,
        TouchSensor::YCcw,
        TouchSensor::Grab,
    ];

    const NAMES: [(&'static str, TouchSensor); TouchSensor::COUNT] = [
        ("x_cw", TouchSensor::XCw),
        ("x_ccw", TouchSensor::XCcw),
        ("y_cw", TouchSensor::YCw),
        ("y_ccw", TouchSensor::YCcw),
        ("grab", TouchSensor::Grab),
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        TouchSensor::NAMES[self.index()].0
    }

    pub fn from_name(name: &str) -> Option<TouchSensor> {
        TouchSensor::NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, sensor)| *sensor)
    }
}

/// One tick's worth of raw readings.  Never retained past the tick that produced it.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct TouchReadings {
    pub x_cw: u16,
    pub x_ccw: u16,
    pub y_cw: u16,
    pub y_ccw: u16,
    pub grab: u16,
}

impl TouchReadings {
    pub fn get(&self, sensor: TouchSensor) -> u16 {
        match sensor {
            TouchSensor::XCw => self.x_cw,
            TouchSensor::XCcw => self.x_ccw,
            TouchSensor::YCw => self.y_cw,
            TouchSensor::YCcw => self.y_ccw,
            TouchSensor::Grab => self.grab,
        }
    }

    pub fn is_triggered(&self, sensor: TouchSensor, threshold: u16) -> bool {
        self.get(sensor) < threshold
    }
}

impl From<[u16; TouchSensor::COUNT]> for TouchReadings {
    fn from(values: [u16; TouchSensor::COUNT]) -> Self {
        Self {
            x_cw: values[TouchSensor::XCw.index()],
            x_ccw: values[TouchSensor::XCcw.index()],
            y_cw: values[TouchSensor::YCw.index()],
            y_ccw: values[TouchSensor::YCcw.index()],
            grab: values[TouchSensor::Grab.index()],
        }
    }
}

pub struct TouchSampler {
    pads: [Box<dyn TouchPad>; TouchSensor::COUNT],
    fault_reading: u16,
}

impl TouchSampler {
    pub fn new(pads: [Box<dyn TouchPad>; TouchSensor::COUNT], fault_reading: u16) -> Self {
        Self { pads, fault_reading }
    }

    /// Reads every pad once.  A failed read is reported and replaced with the fault reading so
    /// the loop keeps going.
    pub fn sample(&mut self) -> TouchReadings {
        let mut values = [self.fault_reading; TouchSensor::COUNT];
        for sensor in TouchSensor::ALL {
            values[sensor.index()] = match self.pads[sensor.index()].read() {
                Ok(value) => value,
                Err(e) => {
                    warn!("TouchPad {} error: {e}", sensor.name());
                    self.fault_reading
                }
            };
            debug!("{} = {}", sensor.name(), values[sensor.index()]);
        }
        TouchReadings::from(values)
    }
}

#[cfg(test)]
mod tests {
    use crate::gantry_hal::HalError;
    use crate::gantry_hal_mock::GantryHalMock;

    use super::*;

    fn sampler_for(mock: &GantryHalMock) -> TouchSampler {
        TouchSampler::new(mock.create_hal().touch_pads, DEFAULT_FAULT_READING)
    }

    #[test]
    fn test_name_lookup_matches_index_order() {
        for sensor in TouchSensor::ALL {
            assert_eq!(TouchSensor::from_name(sensor.name()), Some(sensor));
        }
        assert_eq!(TouchSensor::Grab.name(), "grab");
        assert_eq!(TouchSensor::from_name("z_cw"), None);
    }

    #[test]
    fn test_sample_reads_every_pad() {
        let mock = GantryHalMock::new();
        mock.set_touch(TouchSensor::XCw, Ok(50));
        mock.set_touch(TouchSensor::XCcw, Ok(999));
        mock.set_touch(TouchSensor::YCw, Ok(300));
        mock.set_touch(TouchSensor::YCcw, Ok(120));
        mock.set_touch(TouchSensor::Grab, Ok(10));

        let readings = sampler_for(&mock).sample();
        assert_eq!(
            readings,
            TouchReadings { x_cw: 50, x_ccw: 999, y_cw: 300, y_ccw: 120, grab: 10 });
    }

    #[test]
    fn test_fault_substitutes_sentinel_without_touching_others() {
        for faulty in TouchSensor::ALL {
            let mock = GantryHalMock::new();
            for (i, sensor) in TouchSensor::ALL.iter().enumerate() {
                mock.set_touch(*sensor, Ok(100 + i as u16));
            }
            mock.set_touch(faulty, Err(HalError::Io("touch read failed".to_owned())));

            let readings = sampler_for(&mock).sample();
            for (i, sensor) in TouchSensor::ALL.iter().enumerate() {
                let expected = if *sensor == faulty { DEFAULT_FAULT_READING } else { 100 + i as u16 };
                assert_eq!(readings.get(*sensor), expected, "faulty={faulty:?}, sensor={sensor:?}");
            }
        }
    }

    #[test]
    fn test_faulty_sensor_is_never_triggered() {
        let mock = GantryHalMock::new();
        mock.set_touch(TouchSensor::Grab, Err(HalError::DeviceNotConnected("pad 15".to_owned())));
        let readings = sampler_for(&mock).sample();
        assert!(!readings.is_triggered(TouchSensor::Grab, 200));
    }
}
