//! Peripheral drivers and hardware initialisation.

pub mod activity_led;
pub mod hw_init;
pub mod mpu6050;
pub mod watchdog;
