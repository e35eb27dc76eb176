//! Telemetry packet types and encoder.
//!
//! Wire format (device → bridge, concatenated with no delimiter):
//! ```text
//! ┌──────────┬───────────────┬──────────────────────────┐
//! │ Tag (1B) │ Node id (4B)  │ Payload (0/4/6/28 B)     │
//! │          │ LE u32        │ size implied by the tag  │
//! └──────────┴───────────────┴──────────────────────────┘
//! ```
//!
//! There is no length prefix: the receiver learns the payload size from
//! the tag alone, so the table in [`PacketType::payload_len`] is the
//! contract shared with the bridge. All multi-byte fields are
//! little-endian.

use core::fmt;

use serde::Serialize;

use crate::adapters::device_id::{MacAddress, NodeId};

/// Tag + node id.
pub const HEADER_LEN: usize = 5;

/// Accelerometer payload: 7 × f32.
pub const ACCEL_PAYLOAD_LEN: usize = 28;

/// Largest packet on the wire (an ACCEL packet).
pub const MAX_PACKET_LEN: usize = HEADER_LEN + ACCEL_PAYLOAD_LEN;

/// Packet type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum PacketType {
    /// A basket was placed on the node.
    Basket = 0,
    /// Motion above threshold, with the full IMU reading.
    Accel = 1,
    /// A user button was pressed.
    Button = 2,
    /// Hardware address announcement.
    Mac = 3,
    /// The people sensor fired.
    People = 4,
}

impl PacketType {
    /// Payload size for this tag.
    pub const fn payload_len(self) -> usize {
        match self {
            Self::Basket | Self::People => 0,
            Self::Accel => ACCEL_PAYLOAD_LEN,
            Self::Button => 4,
            Self::Mac => 6,
        }
    }

    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Basket),
            1 => Some(Self::Accel),
            2 => Some(Self::Button),
            3 => Some(Self::Mac),
            4 => Some(Self::People),
            _ => None,
        }
    }
}

/// One IMU sample in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MotionReading {
    /// Acceleration (g), x/y/z.
    pub accel: [f32; 3],
    /// Angular rate (°/s), x/y/z.
    pub gyro: [f32; 3],
    pub temperature_c: f32,
}

impl MotionReading {
    fn write_le(&self, out: &mut [u8]) {
        let fields = self
            .accel
            .iter()
            .chain(self.gyro.iter())
            .chain(core::iter::once(&self.temperature_c));
        for (chunk, value) in out.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut values = [0f32; 7];
        for (value, chunk) in values.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self {
            accel: [values[0], values[1], values[2]],
            gyro: [values[3], values[4], values[5]],
            temperature_c: values[6],
        }
    }
}

/// Typed packet payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Payload {
    Basket,
    Accel(MotionReading),
    Button { index: u32 },
    Mac(MacAddress),
    People,
}

impl Payload {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Self::Basket => PacketType::Basket,
            Self::Accel(_) => PacketType::Accel,
            Self::Button { .. } => PacketType::Button,
            Self::Mac(_) => PacketType::Mac,
            Self::People => PacketType::People,
        }
    }

    fn write_to(&self, out: &mut [u8]) {
        match self {
            Self::Basket | Self::People => {}
            Self::Accel(reading) => reading.write_le(out),
            Self::Button { index } => out.copy_from_slice(&index.to_le_bytes()),
            Self::Mac(mac) => out.copy_from_slice(mac),
        }
    }

    fn read_from(packet_type: PacketType, body: &[u8]) -> Self {
        match packet_type {
            PacketType::Basket => Self::Basket,
            PacketType::People => Self::People,
            PacketType::Accel => Self::Accel(MotionReading::read_le(body)),
            PacketType::Button => Self::Button {
                index: u32::from_le_bytes([body[0], body[1], body[2], body[3]]),
            },
            PacketType::Mac => {
                let mut mac = [0u8; 6];
                mac.copy_from_slice(&body[..6]);
                Self::Mac(mac)
            }
        }
    }
}

/// A packet addressed from one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Packet {
    pub node_id: NodeId,
    pub payload: Payload,
}

impl Packet {
    pub fn new(node_id: NodeId, payload: Payload) -> Self {
        Self { node_id, payload }
    }

    pub fn packet_type(&self) -> PacketType {
        self.payload.packet_type()
    }

    /// Serialise into wire bytes. Never fails: every payload fits.
    pub fn encode(&self) -> EncodedPacket {
        let packet_type = self.packet_type();
        let len = HEADER_LEN + packet_type.payload_len();
        let mut buf = [0u8; MAX_PACKET_LEN];
        buf[0] = packet_type.tag();
        buf[1..HEADER_LEN].copy_from_slice(&self.node_id.to_le_bytes());
        self.payload.write_to(&mut buf[HEADER_LEN..len]);
        EncodedPacket { buf, len }
    }
}

/// Wire bytes of one packet, stack-allocated.
#[derive(Clone, Copy)]
pub struct EncodedPacket {
    buf: [u8; MAX_PACKET_LEN],
    len: usize,
}

impl EncodedPacket {
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for EncodedPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedPacket({:02X?})", self.as_bytes())
    }
}

/// Why [`decode`] rejected its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The first byte is not a known packet tag.
    UnknownTag(u8),
    /// More bytes are needed to complete the packet.
    Incomplete { needed: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag(tag) => write!(f, "unknown packet tag 0x{tag:02X}"),
            Self::Incomplete { needed } => write!(f, "incomplete packet, {needed} more bytes needed"),
        }
    }
}

/// Parse exactly one packet from the front of `bytes`.
///
/// Returns the packet and the number of bytes it occupied.
pub fn decode(bytes: &[u8]) -> Result<(Packet, usize), DecodeError> {
    let Some(&tag) = bytes.first() else {
        return Err(DecodeError::Incomplete { needed: HEADER_LEN });
    };
    let packet_type = PacketType::from_tag(tag).ok_or(DecodeError::UnknownTag(tag))?;
    let len = HEADER_LEN + packet_type.payload_len();
    if bytes.len() < len {
        return Err(DecodeError::Incomplete {
            needed: len - bytes.len(),
        });
    }
    Ok((parse_body(packet_type, &bytes[1..len]), len))
}

/// Build a packet from the bytes following the tag (node id + payload).
pub(super) fn parse_body(packet_type: PacketType, rest: &[u8]) -> Packet {
    let node_id = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]);
    Packet {
        node_id,
        payload: Payload::read_from(packet_type, &rest[4..]),
    }
}
