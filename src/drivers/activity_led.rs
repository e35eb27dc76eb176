//! Activity LED driver.
//!
//! A single GPIO output that lights for a short hold time after each
//! packet the link delivers.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the pin via hw_init.
//! On host/test: writes the simulated pin bank.

use crate::drivers::hw_init::{self, HwInitError};

pub struct ActivityLed {
    pin: i32,
    hold_ms: u32,
    lit_at: Option<u32>,
}

impl ActivityLed {
    pub fn new(pin: i32, hold_ms: u32) -> Result<Self, HwInitError> {
        hw_init::init_output(pin)?;
        Ok(Self {
            pin,
            hold_ms,
            lit_at: None,
        })
    }

    /// Light the LED and restart the hold timer.
    pub fn pulse(&mut self, now_ms: u32) {
        if self.lit_at.is_none() {
            hw_init::gpio_write(self.pin, true);
        }
        self.lit_at = Some(now_ms);
    }

    /// Turn the LED off once the hold time has passed.
    pub fn tick(&mut self, now_ms: u32) {
        if let Some(at) = self.lit_at {
            if now_ms.wrapping_sub(at) >= self.hold_ms {
                hw_init::gpio_write(self.pin, false);
                self.lit_at = None;
            }
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit_at.is_some()
    }
}
