//! TCP client transport adapter.
//!
//! Implements [`StreamTransport`]: a single outbound TCP stream to the
//! bridge. `std::net` sits on lwIP under ESP-IDF, so the same code runs on
//! the device and on the host.
//!
//! ## Connection model
//!
//! 1. `connect()` takes the endpoint's IP literal as-is and makes one
//!    connect attempt bounded by the configured timeout. No DNS lookup and
//!    no internal retry.
//! 2. The connected socket is switched to non-blocking mode with Nagle
//!    disabled, so small packets leave immediately.
//! 3. `write()` never blocks: a full send buffer yields `Ok(0)`.
//! 4. `is_connected()` checks the socket with a one-byte `peek`. An
//!    orderly shutdown by the peer, a socket error, or an earlier hard
//!    write error releases the stream and reports `false`.

use core::fmt;
use std::io::{ErrorKind, Write};
use std::net::TcpStream;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::BridgeEndpoint;
use crate::protocol::transport::StreamTransport;

// ───────────────────────────────────────────────────────────────
// Error type
// ───────────────────────────────────────────────────────────────

/// Errors originating from the TCP transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpTransportError {
    /// Operation requires an open stream but none is present.
    NotConnected,
    /// The endpoint host is not an IP literal.
    Resolve,
    /// Socket I/O failure.
    Io(ErrorKind),
}

impl fmt::Display for TcpTransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "no stream open"),
            Self::Resolve => write!(f, "endpoint host is not an IP address"),
            Self::Io(kind) => write!(f, "socket I/O error: {}", kind),
        }
    }
}

impl From<std::io::Error> for TcpTransportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.kind())
    }
}

// ───────────────────────────────────────────────────────────────
// TcpTransport
// ───────────────────────────────────────────────────────────────

pub struct TcpTransport {
    connect_timeout: Duration,
    stream: Option<TcpStream>,
    /// Set by a hard write error; the next liveness check releases the stream.
    faulted: bool,
}

impl TcpTransport {
    pub fn new(connect_timeout_ms: u32) -> Self {
        Self {
            connect_timeout: Duration::from_millis(u64::from(connect_timeout_ms.max(1))),
            stream: None,
            faulted: false,
        }
    }

    fn release(&mut self, reason: &str) {
        if self.stream.take().is_some() {
            info!("TCP: stream closed ({})", reason);
        }
        self.faulted = false;
    }
}

impl StreamTransport for TcpTransport {
    type Error = TcpTransportError;

    fn connect(&mut self, endpoint: &BridgeEndpoint) -> Result<(), TcpTransportError> {
        self.release("reconnecting");

        let addr = endpoint.socket_addr().ok_or(TcpTransportError::Resolve)?;

        let stream = TcpStream::connect_timeout(&addr, self.connect_timeout)?;
        stream.set_nonblocking(true)?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!("TCP: set_nodelay failed: {}", e);
        }

        info!("TCP: connected to {}", addr);
        self.stream = Some(stream);
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        if self.faulted {
            self.release("write error");
            return false;
        }
        let Some(stream) = self.stream.as_ref() else {
            return false;
        };

        let mut byte = [0u8; 1];
        match stream.peek(&mut byte) {
            // Bridge never sends; an empty read means it hung up.
            Ok(0) => {
                self.release("peer closed");
                false
            }
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::WouldBlock => true,
            Err(e) if e.kind() == ErrorKind::Interrupted => true,
            Err(e) => {
                warn!("TCP: peek failed: {}", e);
                self.release("peek error");
                false
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TcpTransportError> {
        let stream = self.stream.as_mut().ok_or(TcpTransportError::NotConnected)?;
        match stream.write(data) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => {
                self.faulted = true;
                Err(e.into())
            }
        }
    }

    fn close(&mut self) {
        self.release("closed by caller");
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
