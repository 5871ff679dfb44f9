pub mod axis;
pub mod config;
pub mod control_loop;
pub mod gantry_hal;
pub mod gantry_hal_factory;
pub mod gantry_hal_mock;
pub mod gripper;
pub mod motor;
pub mod servo_driver;
pub mod touch_sampler;

mod sysfs;
