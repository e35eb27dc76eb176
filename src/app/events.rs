//! Domain events produced by the detectors.
//!
//! The [`EventDispatcher`](super::dispatcher::EventDispatcher) turns each
//! event into a wire payload with [`NodeEvent::payload`]. Events with no
//! wire representation are only logged.

use crate::protocol::packet::{MotionReading, Payload};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeEvent {
    /// A basket covered the photodiodes.
    BasketEntered,
    /// The basket was lifted off after the bounce guard. Not sent.
    BasketLeft,
    ButtonPressed { index: u32 },
    PeopleDetected,
    /// Motion above threshold.
    Motion(MotionReading),
}

impl NodeEvent {
    /// Payload to send for this event, if it has one.
    pub fn payload(&self) -> Option<Payload> {
        match *self {
            Self::BasketEntered => Some(Payload::Basket),
            Self::BasketLeft => None,
            Self::ButtonPressed { index } => Some(Payload::Button { index }),
            Self::PeopleDetected => Some(Payload::People),
            Self::Motion(reading) => Some(Payload::Accel(reading)),
        }
    }
}
