//! Bridge link manager.
//!
//! Owns the WiFi association and the single TCP stream to the bridge and
//! keeps both alive without ever blocking the control loop.
//!
//! ## States
//!
//! ```text
//!              network up                  connect ok
//! NETWORK_DOWN ──────────▶ DISCONNECTED ─────────────▶ CONNECTED
//!      ▲                     ▲     │ connect err             │
//!      │                     │     └─(retry next tick)       │
//!      │                     └──────── check says dead ◀─────┤
//!      └───────────────────── network lost ◀─────────────────┘
//! ```
//!
//! There is no retry loop and no send queue. A failed connect is retried
//! once per tick; a failed send is logged and the packet is gone. Send
//! failures never change the state: the transport's connectivity check,
//! consulted on the next [`ensure_connected`](LinkManager::ensure_connected),
//! is the only thing that declares the stream dead.

use log::{debug, info, warn};

use crate::app::ports::ConnectivityPort;
use crate::config::BridgeEndpoint;
use crate::error::{Error, LinkError};
use crate::protocol::transport::StreamTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    NetworkDown,
    Disconnected,
    Connected,
}

/// Outcome of [`LinkManager::ensure_connected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCheck {
    /// The stream was already open.
    Connected,
    /// A new session was opened this tick.
    Established,
    /// No usable stream this tick.
    Offline,
}

impl LinkCheck {
    pub fn is_up(self) -> bool {
        !matches!(self, Self::Offline)
    }
}

/// Lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub sent: u32,
    pub failed_sends: u32,
    pub sessions: u32,
    pub connect_failures: u32,
}

pub struct LinkManager<T: StreamTransport, N: ConnectivityPort> {
    transport: T,
    network: N,
    endpoint: BridgeEndpoint,
    state: LinkState,
    stats: LinkStats,
    /// Consecutive failed connect attempts.
    failure_streak: u32,
    last_error: Option<Error>,
    packet_sent: bool,
}

impl<T: StreamTransport, N: ConnectivityPort> LinkManager<T, N> {
    pub fn new(transport: T, network: N, endpoint: BridgeEndpoint) -> Self {
        Self {
            transport,
            network,
            endpoint,
            state: LinkState::NetworkDown,
            stats: LinkStats::default(),
            failure_streak: 0,
            last_error: None,
            packet_sent: false,
        }
    }

    /// Bring the link one step closer to CONNECTED. Never blocks beyond
    /// one bounded connect attempt.
    pub fn ensure_connected(&mut self, now_ms: u32) -> LinkCheck {
        if !self.network.is_connected() {
            if self.state != LinkState::NetworkDown {
                warn!("Link: network down");
                self.transport.close();
                self.state = LinkState::NetworkDown;
                self.last_error = Some(LinkError::NetworkDown.into());
            }
            self.network.poll(now_ms);
            return LinkCheck::Offline;
        }

        if self.state == LinkState::NetworkDown {
            info!("Link: network up");
            self.state = LinkState::Disconnected;
        }

        if self.transport.is_connected() {
            self.state = LinkState::Connected;
            return LinkCheck::Connected;
        }

        if self.state == LinkState::Connected {
            warn!("Link: stream to {} lost", self.endpoint);
            self.state = LinkState::Disconnected;
        }

        self.try_connect()
    }

    fn try_connect(&mut self) -> LinkCheck {
        match self.transport.connect(&self.endpoint) {
            Ok(()) => {
                self.state = LinkState::Connected;
                self.stats.sessions = self.stats.sessions.wrapping_add(1);
                if self.failure_streak > 0 {
                    info!(
                        "Link: connected to {} after {} failed attempts",
                        self.endpoint, self.failure_streak
                    );
                } else {
                    info!("Link: connected to {}", self.endpoint);
                }
                self.failure_streak = 0;
                LinkCheck::Established
            }
            Err(e) => {
                self.stats.connect_failures = self.stats.connect_failures.wrapping_add(1);
                self.last_error = Some(LinkError::ConnectFailed.into());
                if self.failure_streak == 0 {
                    warn!("Link: connect to {} failed: {}", self.endpoint, e);
                } else {
                    debug!(
                        "Link: connect to {} failed again ({}): {}",
                        self.endpoint, self.failure_streak, e
                    );
                }
                self.failure_streak = self.failure_streak.saturating_add(1);
                LinkCheck::Offline
            }
        }
    }

    /// Write one packet. `false` on a partial write or any error; the
    /// state is left untouched either way.
    pub fn send(&mut self, bytes: &[u8]) -> bool {
        if self.state != LinkState::Connected {
            debug!("Link: not connected, dropping {} bytes", bytes.len());
            self.stats.failed_sends = self.stats.failed_sends.wrapping_add(1);
            self.last_error = Some(LinkError::NotConnected.into());
            return false;
        }

        match self.transport.write(bytes) {
            Ok(n) if n == bytes.len() => {
                self.stats.sent = self.stats.sent.wrapping_add(1);
                self.packet_sent = true;
                true
            }
            Ok(n) => {
                warn!("Link: short write, {} of {} bytes", n, bytes.len());
                self.stats.failed_sends = self.stats.failed_sends.wrapping_add(1);
                self.last_error = Some(LinkError::WriteFailed.into());
                false
            }
            Err(e) => {
                warn!("Link: write failed: {}", e);
                self.stats.failed_sends = self.stats.failed_sends.wrapping_add(1);
                self.last_error = Some(LinkError::WriteFailed.into());
                false
            }
        }
    }

    /// `true` if a packet was sent since the last call.
    pub fn take_packet_sent(&mut self) -> bool {
        core::mem::take(&mut self.packet_sent)
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Most recent failure, kept until overwritten by the next one.
    pub fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    pub fn endpoint(&self) -> &BridgeEndpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }
}
