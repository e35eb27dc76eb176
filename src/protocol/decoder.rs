//! Streaming packet decoder (bridge side).
//!
//! The node writes packets back-to-back with no framing beyond the type
//! tag, so the receiver must know every payload size up front. The
//! decoder accumulates bytes and yields complete packets. This handles
//! partial reads gracefully: a single socket read may return part of the
//! header, part of the payload, or several packets concatenated.
//!
//! A byte that is not a known tag cannot be framed. The decoder counts it
//! as a desync and skips it, which resynchronises on the next valid tag.

use super::packet::{parse_body, Packet, PacketType, MAX_PACKET_LEN};

/// Decoder state machine.
enum DecoderState {
    /// Waiting for a type tag.
    ReadingTag,
    /// Tag received, reading node id + payload.
    ReadingBody {
        packet_type: PacketType,
        expected: usize,
        collected: usize,
    },
}

/// Streaming packet decoder.
pub struct PacketDecoder {
    state: DecoderState,
    body_buf: [u8; MAX_PACKET_LEN],
    desyncs: u32,
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::ReadingTag,
            body_buf: [0; MAX_PACKET_LEN],
            desyncs: 0,
        }
    }

    /// Feed bytes into the decoder, calling `on_packet` for every packet
    /// completed by this chunk. Returns the number of packets completed.
    pub fn feed(&mut self, data: &[u8], mut on_packet: impl FnMut(Packet)) -> usize {
        let mut offset = 0;
        let mut completed = 0;

        while offset < data.len() {
            match &mut self.state {
                DecoderState::ReadingTag => {
                    let tag = data[offset];
                    offset += 1;

                    match PacketType::from_tag(tag) {
                        Some(packet_type) => {
                            self.state = DecoderState::ReadingBody {
                                packet_type,
                                // node id + payload
                                expected: 4 + packet_type.payload_len(),
                                collected: 0,
                            };
                        }
                        None => {
                            self.desyncs = self.desyncs.saturating_add(1);
                            log::debug!("Decoder: skipping unknown tag 0x{:02X}", tag);
                        }
                    }
                }

                DecoderState::ReadingBody {
                    packet_type,
                    expected,
                    collected,
                } => {
                    let needed = *expected - *collected;
                    let available = data.len() - offset;
                    let to_copy = needed.min(available);

                    self.body_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);

                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == *expected {
                        let packet = parse_body(*packet_type, &self.body_buf[..*expected]);
                        self.state = DecoderState::ReadingTag;
                        completed += 1;
                        on_packet(packet);
                    }
                }
            }
        }

        completed
    }

    /// Bytes skipped because they were not a valid tag.
    pub fn desyncs(&self) -> u32 {
        self.desyncs
    }

    /// `true` when no partial packet is buffered.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, DecoderState::ReadingTag)
    }

    /// Drop any partial packet (e.g. after the node reconnects).
    pub fn reset(&mut self) {
        self.state = DecoderState::ReadingTag;
    }
}
