//! Fuzz target: `PacketDecoder::feed` and `decode`
//!
//! Drives arbitrary byte sequences into the streaming packet decoder and
//! the one-shot decoder. Neither may panic, every decoded packet must
//! re-encode to the bytes it came from, and feeding the same input in two
//! halves must give the same packets as feeding it whole.
//!
//! cargo fuzz run fuzz_packet_decoder

#![no_main]

use basketnode::protocol::decoder::PacketDecoder;
use basketnode::protocol::packet::{decode, MAX_PACKET_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((packet, used)) = decode(data) {
        assert!(used <= MAX_PACKET_LEN);
        let encoded = packet.encode();
        // NaN payload bits survive the round trip byte-for-byte.
        assert_eq!(encoded.as_bytes(), &data[..used]);
    }

    let mut whole = Vec::new();
    let mut decoder = PacketDecoder::new();
    decoder.feed(data, |p| whole.push(p.encode()));

    let mid = data.len() / 2;
    let mut split = Vec::new();
    decoder.reset();
    decoder.feed(&data[..mid], |p| split.push(p.encode()));
    decoder.feed(&data[mid..], |p| split.push(p.encode()));

    assert_eq!(whole.len(), split.len());
    for (a, b) in whole.iter().zip(&split) {
        assert_eq!(a.as_bytes(), b.as_bytes());
    }
});
