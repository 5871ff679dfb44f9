pub mod gantry_hal_sysfs;
mod gpio_line;
mod i2c_bus;
mod iio_touch_pad;
mod pwm_channel;
