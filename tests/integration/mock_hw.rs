//! Mock adapters for integration tests.
//!
//! Every mock records what the firmware asked of it so tests can assert
//! on the full history without touching real GPIO, sockets, or I²C.

use basketnode::app::ports::{AccelerometerPort, ConnectivityPort, LinePort};
use basketnode::config::BridgeEndpoint;
use basketnode::error::SensorError;
use basketnode::protocol::decoder::PacketDecoder;
use basketnode::protocol::packet::{MotionReading, Packet};
use basketnode::protocol::transport::StreamTransport;
use std::collections::HashMap;

// ── MockLines ─────────────────────────────────────────────────

/// Input lines with settable levels. Unset pins read high (idle with
/// pull-ups).
#[derive(Default)]
pub struct MockLines {
    levels: HashMap<i32, bool>,
}

#[allow(dead_code)]
impl MockLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive an active-low line to its active (low) level.
    pub fn activate(&mut self, pin: i32) {
        self.levels.insert(pin, false);
    }

    pub fn release(&mut self, pin: i32) {
        self.levels.insert(pin, true);
    }
}

impl LinePort for MockLines {
    fn read_level(&mut self, pin: i32) -> bool {
        self.levels.get(&pin).copied().unwrap_or(true)
    }
}

// ── MockNetwork ───────────────────────────────────────────────

pub struct MockNetwork {
    pub up: bool,
    pub polls: u32,
}

#[allow(dead_code)]
impl MockNetwork {
    pub fn up() -> Self {
        Self { up: true, polls: 0 }
    }

    pub fn down() -> Self {
        Self { up: false, polls: 0 }
    }
}

impl ConnectivityPort for MockNetwork {
    fn poll(&mut self, _now_ms: u32) {
        self.polls += 1;
    }

    fn is_connected(&self) -> bool {
        self.up
    }
}

// ── MockTransport ─────────────────────────────────────────────

/// Stream that records every accepted byte. Writes can be scripted to
/// fail a fixed number of times.
#[derive(Default)]
pub struct MockTransport {
    pub open: bool,
    pub refuse_connect: bool,
    /// Remaining writes to reject.
    pub failing_writes: u32,
    pub connects: u32,
    pub closes: u32,
    pub written: Vec<u8>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode everything written so far.
    pub fn packets(&self) -> Vec<Packet> {
        let mut decoder = PacketDecoder::new();
        let mut out = Vec::new();
        decoder.feed(&self.written, |p| out.push(p));
        assert!(decoder.is_idle(), "trailing partial packet on the wire");
        out
    }
}

impl StreamTransport for MockTransport {
    type Error = &'static str;

    fn connect(&mut self, _endpoint: &BridgeEndpoint) -> Result<(), &'static str> {
        self.connects += 1;
        if self.refuse_connect {
            return Err("connection refused");
        }
        self.open = true;
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        self.open
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, &'static str> {
        if !self.open {
            return Err("not connected");
        }
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err("connection reset");
        }
        self.written.extend_from_slice(data);
        Ok(data.len())
    }

    fn close(&mut self) {
        self.closes += 1;
        self.open = false;
    }
}

// ── MockImu ───────────────────────────────────────────────────

/// Accelerometer returning a fixed reading.
pub struct MockImu {
    pub present: bool,
    pub reading: MotionReading,
    pub inits: u32,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockImu {
    pub fn moving() -> Self {
        Self::with_accel([0.6, 0.0, 1.0])
    }

    pub fn at_rest() -> Self {
        Self::with_accel([0.01, -0.02, 1.0])
    }

    fn with_accel(accel: [f32; 3]) -> Self {
        Self {
            present: true,
            reading: MotionReading {
                accel,
                gyro: [0.0; 3],
                temperature_c: 24.5,
            },
            inits: 0,
            reads: 0,
        }
    }
}

impl AccelerometerPort for MockImu {
    fn init(&mut self) -> Result<(), SensorError> {
        self.inits += 1;
        if self.present {
            Ok(())
        } else {
            Err(SensorError::NotResponding)
        }
    }

    fn calibrate(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn available(&mut self) -> bool {
        self.present
    }

    fn read(&mut self) -> Result<MotionReading, SensorError> {
        self.reads += 1;
        if self.present {
            Ok(self.reading)
        } else {
            Err(SensorError::BusFault)
        }
    }
}
