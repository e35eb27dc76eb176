//! Stream transport abstraction: the socket under the link manager.
//!
//! Concrete implementations:
//! - TCP over WiFi ([`TcpTransport`](crate::adapters::tcp_transport::TcpTransport))
//! - recording mocks in the integration tests
//!
//! The [`LinkManager`](crate::link::LinkManager) is generic over
//! `StreamTransport`, so a different socket needs no change to the link
//! logic.

use crate::config::BridgeEndpoint;

/// Byte-oriented, connection-oriented outbound channel.
pub trait StreamTransport {
    /// Error type for this transport.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Make one bounded connect attempt. Must not retry internally.
    fn connect(&mut self, endpoint: &BridgeEndpoint) -> Result<(), Self::Error>;

    /// Connectivity check. Returns `false` once the peer has gone away or
    /// a previous write hit a hard error; implementations release the
    /// dead socket here.
    fn is_connected(&mut self) -> bool;

    /// Write `data` without blocking.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Drop the stream, if any.
    fn close(&mut self);
}
