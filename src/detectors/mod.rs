//! Detector state machines.
//!
//! Each detector turns sampled input into discrete events and owns its
//! own state; the [`EventDispatcher`](crate::app::dispatcher::EventDispatcher)
//! polls them in a fixed order once per tick.
//!
//! [`DetectorSet`] is the node's capability set: it is built from
//! [`NodeConfig`] and holds only the detectors whose lines are configured.

pub mod button;
pub mod debounce;
pub mod motion;
pub mod people;
pub mod presence;

use heapless::Vec;

use crate::app::events::NodeEvent;
use crate::app::ports::LinePort;
use crate::config::{NodeConfig, MAX_BUTTONS, MAX_PHOTODIODES};

use button::{ButtonArbiter, ButtonDetector};
use people::PeopleDetector;
use presence::{PresenceDetector, PresenceEvent};

/// Events one tick of the line-driven detectors can produce: one presence
/// transition, one press per button, and one people detection.
pub const MAX_LINE_EVENTS: usize = 1 + MAX_BUTTONS + 1;

/// Polarity normalisation for raw line levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInput {
    active_low: bool,
}

impl LineInput {
    pub fn new(active_low: bool) -> Self {
        Self { active_low }
    }

    /// `true` when `pin` is in its active state.
    pub fn is_active(&self, lines: &mut impl LinePort, pin: i32) -> bool {
        lines.read_level(pin) != self.active_low
    }
}

struct Presence {
    pins: Vec<i32, MAX_PHOTODIODES>,
    detector: PresenceDetector,
}

/// All line-driven detectors configured on this node.
pub struct DetectorSet {
    input: LineInput,
    presence: Option<Presence>,
    buttons: Vec<ButtonDetector, MAX_BUTTONS>,
    arbiter: ButtonArbiter,
    people: Option<PeopleDetector>,
}

impl DetectorSet {
    pub fn from_config(config: &NodeConfig) -> Self {
        let presence = (!config.presence_pins.is_empty()).then(|| Presence {
            pins: config.presence_pins.clone(),
            detector: PresenceDetector::new(config.bounce_guard_ms),
        });

        let mut buttons = Vec::new();
        for (index, &pin) in config.button_pins.iter().enumerate() {
            // Same capacity as the config vector; cannot overflow.
            let _ = buttons.push(ButtonDetector::new(index as u32, pin));
        }

        log::info!(
            "Detectors: presence={} buttons={} people={}",
            presence.as_ref().map_or(0, |p| p.pins.len()),
            buttons.len(),
            config.people_pin.is_some()
        );

        Self {
            input: LineInput::new(config.lines_active_low),
            presence,
            buttons,
            arbiter: ButtonArbiter::new(config.button_policy),
            people: config.people_pin.map(PeopleDetector::new),
        }
    }

    pub fn has_presence(&self) -> bool {
        self.presence.is_some()
    }

    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    pub fn has_people(&self) -> bool {
        self.people.is_some()
    }

    /// Poll presence, then every button in index order, then the people
    /// sensor.
    pub fn poll(&mut self, lines: &mut impl LinePort, now_ms: u32) -> Vec<NodeEvent, MAX_LINE_EVENTS> {
        let mut events = Vec::new();
        let input = self.input;

        if let Some(presence) = self.presence.as_mut() {
            // Present only when every photodiode is covered.
            let covered = presence.pins.iter().all(|&pin| input.is_active(lines, pin));
            let event = match presence.detector.poll(covered, now_ms) {
                Some(PresenceEvent::Entered) => Some(NodeEvent::BasketEntered),
                Some(PresenceEvent::Left) => Some(NodeEvent::BasketLeft),
                None => None,
            };
            if let Some(event) = event {
                let _ = events.push(event);
            }
        }

        for button in &mut self.buttons {
            let pressed = input.is_active(lines, button.pin());
            if let Some(index) = button.poll(pressed, &mut self.arbiter) {
                let _ = events.push(NodeEvent::ButtonPressed { index });
            }
        }

        if let Some(people) = self.people.as_mut() {
            if people.poll(input.is_active(lines, people.pin())) {
                let _ = events.push(NodeEvent::PeopleDetected);
            }
        }

        events
    }
}
