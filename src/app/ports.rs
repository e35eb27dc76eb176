//! Port traits: the hexagonal boundary between detector logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ detectors / EventDispatcher (domain)
//! ```
//!
//! Driven adapters (GPIO lines, the IMU, the WiFi driver, the system
//! timer) implement these traits. The dispatcher and detectors consume
//! them via generics, so the domain core never touches hardware directly
//! and every port can be replaced by a recording mock in tests.
//!
//! The stream transport port lives with the protocol it carries, in
//! [`crate::protocol::transport`].

use crate::error::SensorError;
use crate::protocol::packet::MotionReading;

// ───────────────────────────────────────────────────────────────
// Digital input lines (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw digital input. Polarity is normalised by the caller.
pub trait LinePort {
    /// Electrical level of `pin` (`true` = high).
    fn read_level(&mut self, pin: i32) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Accelerometer (driven adapter: IMU → domain)
// ───────────────────────────────────────────────────────────────

/// 6-axis IMU with on-die temperature sensor.
pub trait AccelerometerPort {
    /// Detect and configure the device.
    fn init(&mut self) -> Result<(), SensorError>;

    /// Measure and store zero offsets. Blocks for a bounded time; the
    /// device must be at rest.
    fn calibrate(&mut self) -> Result<(), SensorError>;

    /// Cheap presence check, consulted before every sample.
    fn available(&mut self) -> bool;

    /// One calibrated reading in physical units.
    fn read(&mut self) -> Result<MotionReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Network association (driven adapter: WiFi driver → link)
// ───────────────────────────────────────────────────────────────

/// Link-layer association, advanced without blocking.
pub trait ConnectivityPort {
    /// Advance the association state machine. Called once per tick while
    /// the network is down.
    fn poll(&mut self, now_ms: u32);

    /// `true` once associated and holding an IP address.
    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Monotonic clock
// ───────────────────────────────────────────────────────────────

/// Millisecond tick source. Wraps at `u32::MAX`; consumers use
/// `wrapping_sub` for intervals.
pub trait Clock {
    fn now_ms(&self) -> u32;
}
