//! Edge detector over a normalised boolean level.
//!
//! The gate remembers whether its input is currently active and reports
//! only the transitions. Feeding the same level repeatedly reports
//! nothing after the first edge, which is what turns a level-sampled
//! input into one event per press or arrival.

/// Transition reported by [`DebounceGate::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    None,
    /// inactive → active
    Rose,
    /// active → inactive
    Fell,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceGate {
    active: bool,
}

impl DebounceGate {
    pub const fn new() -> Self {
        Self { active: false }
    }

    /// Feed the current level (`true` = active).
    pub fn poll(&mut self, level: bool) -> Edge {
        match (level, self.active) {
            (true, false) => {
                self.active = true;
                Edge::Rose
            }
            (false, true) => {
                self.active = false;
                Edge::Fell
            }
            _ => Edge::None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
