//! Link integration tests over a real loopback socket.
//!
//! A local `TcpListener` stands in for the bridge; whatever the node
//! writes is read back and run through the bridge-side decoder.

use std::io::{ErrorKind, Read};
use std::net::{TcpListener, TcpStream};
use std::time::{Duration, Instant};

use basketnode::adapters::device_id;
use basketnode::adapters::tcp_transport::TcpTransport;
use basketnode::app::dispatcher::EventDispatcher;
use basketnode::config::{BridgeEndpoint, NodeConfig};
use basketnode::error::{Error, LinkError};
use basketnode::link::{LinkCheck, LinkManager, LinkState};
use basketnode::pins;
use basketnode::protocol::decoder::PacketDecoder;
use basketnode::protocol::packet::{MotionReading, Packet, Payload};

use crate::mock_hw::{MockImu, MockLines, MockNetwork};

// ── Helpers ───────────────────────────────────────────────────

fn bridge() -> (TcpListener, BridgeEndpoint) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, BridgeEndpoint::new("127.0.0.1", port))
}

/// Read from `peer` until `count` packets decode or a second passes.
fn receive(peer: &mut TcpStream, count: usize) -> Vec<Packet> {
    peer.set_read_timeout(Some(Duration::from_millis(50))).unwrap();
    let deadline = Instant::now() + Duration::from_secs(1);
    let mut decoder = PacketDecoder::new();
    let mut packets = Vec::new();
    let mut buf = [0u8; 7];

    while packets.len() < count && Instant::now() < deadline {
        match peer.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                decoder.feed(&buf[..n], |p| packets.push(p));
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) => panic!("bridge read failed: {e}"),
        }
    }
    packets
}

fn tcp_link(endpoint: BridgeEndpoint) -> LinkManager<TcpTransport, MockNetwork> {
    LinkManager::new(TcpTransport::new(500), MockNetwork::up(), endpoint)
}

// ── Tests ─────────────────────────────────────────────────────

#[test]
fn packets_arrive_in_order_and_decode() {
    let (listener, endpoint) = bridge();
    let mut link = tcp_link(endpoint);

    assert_eq!(link.ensure_connected(0), LinkCheck::Established);
    let (mut peer, _) = listener.accept().unwrap();

    let reading = MotionReading {
        accel: [0.5, -0.25, 1.0],
        gyro: [1.5, 0.0, -3.0],
        temperature_c: 22.0,
    };
    let sent = [
        Packet::new(42, Payload::Basket),
        Packet::new(42, Payload::Accel(reading)),
        Packet::new(42, Payload::Button { index: 3 }),
    ];
    for packet in &sent {
        assert!(link.send(packet.encode().as_bytes()));
    }

    assert_eq!(receive(&mut peer, sent.len()), sent.to_vec());
    assert_eq!(link.stats().sent, 3);
}

#[test]
fn unreachable_bridge_stays_offline_and_counts_failures() {
    let (listener, endpoint) = bridge();
    drop(listener);
    let mut link = tcp_link(endpoint);

    assert_eq!(link.ensure_connected(0), LinkCheck::Offline);
    assert_eq!(link.ensure_connected(1), LinkCheck::Offline);
    assert_eq!(link.state(), LinkState::Disconnected);
    assert_eq!(link.stats().connect_failures, 2);
    assert_eq!(link.last_error(), Some(Error::Link(LinkError::ConnectFailed)));
    assert!(!link.send(&[0x04, 0, 0, 0, 0]));
}

#[test]
fn bridge_hangup_is_detected_and_session_reopened() {
    let (listener, endpoint) = bridge();
    let mut link = tcp_link(endpoint);

    assert_eq!(link.ensure_connected(0), LinkCheck::Established);
    let (peer, _) = listener.accept().unwrap();
    drop(peer);

    // The FIN takes a moment to land; keep ticking until the peek sees it.
    let mut reopened = false;
    for t in 1..100 {
        if link.ensure_connected(t) == LinkCheck::Established {
            reopened = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(reopened, "hang-up was never detected");
    assert_eq!(link.stats().sessions, 2);

    let (mut peer, _) = listener.accept().unwrap();
    assert!(link.send(Packet::new(1, Payload::People).encode().as_bytes()));
    assert_eq!(
        receive(&mut peer, 1),
        vec![Packet::new(1, Payload::People)]
    );
}

#[test]
fn dispatcher_delivers_button_press_to_bridge() {
    let (listener, endpoint) = bridge();
    let mut config = NodeConfig::default();
    config.accelerometer = false;
    config.announce_mac_on_connect = true;
    config.button_pins.push(pins::CUSTOM_BUTTON_0_GPIO).unwrap();

    let mac = [0x5C, 0xCF, 0x7F, 0x12, 0x34, 0x57];
    let node_id = device_id::node_id(&mac);
    let link = LinkManager::new(TcpTransport::new(500), MockNetwork::up(), endpoint);
    let mut d: EventDispatcher<_, _, MockImu> = EventDispatcher::new(&config, mac, node_id, link, None);
    let mut lines = MockLines::new();

    d.tick(&mut lines, 0);
    let (mut peer, _) = listener.accept().unwrap();

    lines.activate(pins::CUSTOM_BUTTON_0_GPIO);
    d.tick(&mut lines, 10);

    let packets = receive(&mut peer, 2);
    assert_eq!(
        packets,
        vec![
            Packet::new(0x89D2_1C33, Payload::Mac(mac)),
            Packet::new(0x89D2_1C33, Payload::Button { index: 0 }),
        ]
    );
}
