//! People sensor (PIR-style line). Reports each rising edge.

use super::debounce::{DebounceGate, Edge};

pub struct PeopleDetector {
    pin: i32,
    gate: DebounceGate,
}

impl PeopleDetector {
    pub fn new(pin: i32) -> Self {
        Self {
            pin,
            gate: DebounceGate::new(),
        }
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    /// Returns `true` when people were newly detected.
    pub fn poll(&mut self, detected: bool) -> bool {
        if self.gate.poll(detected) == Edge::Rose {
            log::info!("People: detected");
            true
        } else {
            false
        }
    }
}
