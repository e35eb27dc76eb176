//! GPIO input adapter.
//!
//! Implements [`LinePort`] over the raw pin access in
//! [`hw_init`](crate::drivers::hw_init). Pins must have been configured
//! with [`hw_init::init_inputs`] first.

use crate::app::ports::LinePort;
use crate::drivers::hw_init;

#[derive(Debug, Default, Clone, Copy)]
pub struct GpioLines;

impl GpioLines {
    pub fn new() -> Self {
        Self
    }
}

impl LinePort for GpioLines {
    fn read_level(&mut self, pin: i32) -> bool {
        hw_init::gpio_read(pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_simulated_level() {
        // GPIO46 is reserved for this test.
        let mut lines = GpioLines::new();
        hw_init::sim_set_level(46, false);
        assert!(!lines.read_level(46));
        hw_init::sim_set_level(46, true);
        assert!(lines.read_level(46));
    }
}
