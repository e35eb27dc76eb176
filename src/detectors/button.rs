//! User button detectors.
//!
//! One [`ButtonDetector`] per physical button, each on its own
//! [`DebounceGate`]. The button group shares a [`ButtonArbiter`] that
//! applies the configured [`ButtonPolicy`]:
//!
//! | Policy        | Press on *i* reported when | Release of *i* |
//! |---------------|----------------------------|----------------|
//! | `Independent` | always                     | no effect      |
//! | `Exclusive`   | no button is held          | clears hold if *i* held it |

use crate::config::ButtonPolicy;

use super::debounce::{DebounceGate, Edge};

/// Group-wide press arbitration.
#[derive(Debug, Clone, Copy)]
pub struct ButtonArbiter {
    policy: ButtonPolicy,
    active: Option<u32>,
}

impl ButtonArbiter {
    pub fn new(policy: ButtonPolicy) -> Self {
        Self { policy, active: None }
    }

    /// Button currently holding the group (exclusive policy only).
    pub fn active(&self) -> Option<u32> {
        self.active
    }

    fn on_press(&mut self, index: u32) -> bool {
        match self.policy {
            ButtonPolicy::Independent => true,
            ButtonPolicy::Exclusive => {
                if self.active.is_some() {
                    return false;
                }
                self.active = Some(index);
                true
            }
        }
    }

    fn on_release(&mut self, index: u32) {
        if self.active == Some(index) {
            self.active = None;
        }
    }
}

pub struct ButtonDetector {
    index: u32,
    pin: i32,
    gate: DebounceGate,
}

impl ButtonDetector {
    pub fn new(index: u32, pin: i32) -> Self {
        Self {
            index,
            pin,
            gate: DebounceGate::new(),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    /// Feed the normalised "pressed" level. Returns the button index when
    /// a press should be reported.
    pub fn poll(&mut self, pressed: bool, arbiter: &mut ButtonArbiter) -> Option<u32> {
        match self.gate.poll(pressed) {
            Edge::Rose => {
                if arbiter.on_press(self.index) {
                    log::info!("Button: {} pressed", self.index);
                    Some(self.index)
                } else {
                    log::debug!("Button: {} pressed while another is held, ignored", self.index);
                    None
                }
            }
            Edge::Fell => {
                arbiter.on_release(self.index);
                None
            }
            Edge::None => None,
        }
    }
}
