//! Basket presence detector.
//!
//! ## States
//!
//! ```text
//!            signal                     !signal && dwell > guard
//!   ABSENT ─────────▶ PRESENT ──────────────────────────────────▶ ABSENT
//!           (Entered)                         (Left)
//! ```
//!
//! Entry is reported on the first tick the photodiodes see the basket.
//! Exit is asymmetric: a basket being set down rocks and briefly uncovers
//! the sensor, so a falling signal is withheld until the basket has been
//! present for longer than the bounce guard.

use super::debounce::{DebounceGate, Edge};

/// Presence transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    Entered,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresencePhase {
    Absent,
    Present,
}

pub struct PresenceDetector {
    gate: DebounceGate,
    entered_at: u32,
    bounce_guard_ms: u32,
}

impl PresenceDetector {
    pub fn new(bounce_guard_ms: u32) -> Self {
        Self {
            gate: DebounceGate::new(),
            entered_at: 0,
            bounce_guard_ms,
        }
    }

    /// Feed the normalised "basket present" signal.
    pub fn poll(&mut self, present: bool, now_ms: u32) -> Option<PresenceEvent> {
        let within_guard =
            self.gate.is_active() && now_ms.wrapping_sub(self.entered_at) <= self.bounce_guard_ms;
        let level = present || within_guard;

        match self.gate.poll(level) {
            Edge::Rose => {
                self.entered_at = now_ms;
                log::info!("Presence: basket entered at {} ms", now_ms);
                Some(PresenceEvent::Entered)
            }
            Edge::Fell => {
                log::info!(
                    "Presence: basket left after {} ms",
                    now_ms.wrapping_sub(self.entered_at)
                );
                Some(PresenceEvent::Left)
            }
            Edge::None => None,
        }
    }

    pub fn phase(&self) -> PresencePhase {
        if self.gate.is_active() {
            PresencePhase::Present
        } else {
            PresencePhase::Absent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_is_immediate() {
        let mut p = PresenceDetector::new(1500);
        assert_eq!(p.phase(), PresencePhase::Absent);
        assert_eq!(p.poll(true, 0), Some(PresenceEvent::Entered));
        assert_eq!(p.phase(), PresencePhase::Present);
        assert_eq!(p.poll(true, 10), None);
    }

    #[test]
    fn exit_waits_for_bounce_guard() {
        let mut p = PresenceDetector::new(1500);
        p.poll(true, 0);
        assert_eq!(p.poll(false, 1000), None);
        assert_eq!(p.phase(), PresencePhase::Present);
        assert_eq!(p.poll(false, 1500), None);
        assert_eq!(p.poll(false, 1600), Some(PresenceEvent::Left));
        assert_eq!(p.phase(), PresencePhase::Absent);
    }

    #[test]
    fn bounce_inside_guard_does_not_re_enter() {
        let mut p = PresenceDetector::new(1500);
        assert_eq!(p.poll(true, 0), Some(PresenceEvent::Entered));
        assert_eq!(p.poll(false, 100), None);
        assert_eq!(p.poll(true, 200), None);
        assert_eq!(p.poll(false, 300), None);
        assert_eq!(p.poll(true, 400), None);
    }

    #[test]
    fn exit_after_long_dwell_is_immediate() {
        let mut p = PresenceDetector::new(1500);
        p.poll(true, 0);
        p.poll(true, 5000);
        assert_eq!(p.poll(false, 5001), Some(PresenceEvent::Left));
    }

    #[test]
    fn re_entry_records_new_entry_time() {
        let mut p = PresenceDetector::new(1500);
        p.poll(true, 0);
        p.poll(false, 2000);
        assert_eq!(p.poll(true, 3000), Some(PresenceEvent::Entered));
        assert_eq!(p.poll(false, 4000), None);
        assert_eq!(p.poll(false, 4501), Some(PresenceEvent::Left));
    }

    #[test]
    fn guard_survives_clock_wrap() {
        let mut p = PresenceDetector::new(1500);
        let start = u32::MAX - 500;
        p.poll(true, start);
        assert_eq!(p.poll(false, 400), None);
        assert_eq!(p.poll(false, 1100), Some(PresenceEvent::Left));
    }
}
