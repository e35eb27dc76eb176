//! Event dispatcher: the node's control loop body.
//!
//! [`EventDispatcher`] owns the link, the line detectors, and the motion
//! sampler with its IMU. One call to [`tick`](EventDispatcher::tick) runs
//! every component once, in a fixed order:
//!
//! ```text
//!  1. LinkManager::ensure_connected   (MAC announce on a new session)
//!  2. presence                        → BASKET
//!  3. buttons, in index order         → BUTTON
//!  4. people sensor                   → PEOPLE
//!  5. motion sampler                  → ACCEL
//! ```
//!
//! Cheap line detectors run before the I²C-bound motion check. Packets are
//! built and sent the moment their event is produced. While the link is
//! down every event is dropped: nothing is queued, so the next packet the
//! bridge sees always reflects current detector state.

use log::{debug, info};

use crate::adapters::device_id::{MacAddress, NodeId};
use crate::config::NodeConfig;
use crate::detectors::motion::{MotionConfig, MotionPhase, MotionSampler};
use crate::detectors::DetectorSet;
use crate::link::{LinkCheck, LinkManager};
use crate::protocol::packet::{Packet, Payload};
use crate::protocol::transport::StreamTransport;

use super::events::NodeEvent;
use super::ports::{AccelerometerPort, ConnectivityPort, LinePort};

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Packets produced by detectors (and MAC announcements).
    pub emitted: u32,
    /// Packets fully written to the bridge.
    pub delivered: u32,
    /// Packets lost to a down link or a failed write.
    pub dropped: u32,
    pub link: LinkCheck,
}

impl TickReport {
    fn new(link: LinkCheck) -> Self {
        Self {
            emitted: 0,
            delivered: 0,
            dropped: 0,
            link,
        }
    }
}

pub struct EventDispatcher<T: StreamTransport, N: ConnectivityPort, A: AccelerometerPort> {
    node_id: NodeId,
    mac: MacAddress,
    announce_mac: bool,
    link: LinkManager<T, N>,
    detectors: DetectorSet,
    motion: Option<(MotionSampler, A)>,
}

impl<T: StreamTransport, N: ConnectivityPort, A: AccelerometerPort> EventDispatcher<T, N, A> {
    /// `accel` is ignored unless the config enables the accelerometer.
    pub fn new(
        config: &NodeConfig,
        mac: MacAddress,
        node_id: NodeId,
        link: LinkManager<T, N>,
        accel: Option<A>,
    ) -> Self {
        let motion = accel
            .filter(|_| config.accelerometer)
            .map(|a| (MotionSampler::new(MotionConfig::from_config(config)), a));

        info!(
            "Dispatcher: node 0x{:08X}, bridge {}, motion {}",
            node_id,
            link.endpoint(),
            if motion.is_some() { "on" } else { "off" }
        );

        Self {
            node_id,
            mac,
            announce_mac: config.announce_mac_on_connect,
            link,
            detectors: DetectorSet::from_config(config),
            motion,
        }
    }

    /// Run every component once.
    pub fn tick(&mut self, lines: &mut impl LinePort, now_ms: u32) -> TickReport {
        let link = self.link.ensure_connected(now_ms);
        let mut report = TickReport::new(link);

        if link == LinkCheck::Established && self.announce_mac {
            self.send(Payload::Mac(self.mac), &mut report);
        }

        for event in self.detectors.poll(lines, now_ms) {
            self.dispatch(event, &mut report);
        }

        if let Some((sampler, accel)) = self.motion.as_mut() {
            if let Some(reading) = sampler.poll(accel, now_ms) {
                self.dispatch(NodeEvent::Motion(reading), &mut report);
            }
        }

        report
    }

    fn dispatch(&mut self, event: NodeEvent, report: &mut TickReport) {
        match event.payload() {
            Some(payload) => self.send(payload, report),
            None => debug!("Dispatcher: {:?} (not sent)", event),
        }
    }

    fn send(&mut self, payload: Payload, report: &mut TickReport) {
        report.emitted += 1;
        if !report.link.is_up() {
            debug!("Dispatcher: link down, dropping {:?}", payload.packet_type());
            report.dropped += 1;
            return;
        }

        let packet = Packet::new(self.node_id, payload).encode();
        if self.link.send(packet.as_bytes()) {
            report.delivered += 1;
        } else {
            report.dropped += 1;
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn link(&self) -> &LinkManager<T, N> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut LinkManager<T, N> {
        &mut self.link
    }

    pub fn motion_phase(&self) -> Option<MotionPhase> {
        self.motion.as_ref().map(|(sampler, _)| sampler.phase())
    }

    pub fn accelerometer_mut(&mut self) -> Option<&mut A> {
        self.motion.as_mut().map(|(_, accel)| accel)
    }
}
