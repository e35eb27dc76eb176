//! EventDispatcher integration tests.
//!
//! Drive the full tick (link, line detectors, motion sampler) against
//! mock adapters and decode what reached the wire.

use basketnode::adapters::device_id::{self, MacAddress};
use basketnode::app::dispatcher::EventDispatcher;
use basketnode::config::{BridgeEndpoint, ButtonPolicy, NodeConfig};
use basketnode::detectors::motion::MotionPhase;
use basketnode::link::{LinkCheck, LinkManager};
use basketnode::pins;
use basketnode::protocol::packet::{PacketType, Payload};

use crate::mock_hw::{MockImu, MockLines, MockNetwork, MockTransport};

const MAC: MacAddress = [0x5C, 0xCF, 0x7F, 0x12, 0x34, 0x56];
const NODE_ID: u32 = 0x2648_DBA6;

const PHOTO: i32 = pins::PHOTO_DIODE_0_GPIO;
const BUTTON_0: i32 = pins::CUSTOM_BUTTON_0_GPIO;
const BUTTON_1: i32 = pins::CUSTOM_BUTTON_1_GPIO;
const PEOPLE: i32 = pins::PEOPLE_SENSOR_GPIO;

type Dispatcher = EventDispatcher<MockTransport, MockNetwork, MockImu>;

// ── Helpers ───────────────────────────────────────────────────

fn line_config() -> NodeConfig {
    let mut config = NodeConfig::default();
    config.accelerometer = false;
    config.button_pins.clear();
    config.button_pins.push(BUTTON_0).unwrap();
    config.button_pins.push(BUTTON_1).unwrap();
    config.people_pin = Some(PEOPLE);
    config
}

fn dispatcher_with(config: &NodeConfig, network: MockNetwork, imu: Option<MockImu>) -> Dispatcher {
    let link = LinkManager::new(
        MockTransport::new(),
        network,
        BridgeEndpoint::new("192.168.4.1", 9000),
    );
    EventDispatcher::new(config, MAC, device_id::node_id(&MAC), link, imu)
}

fn dispatcher(config: &NodeConfig) -> Dispatcher {
    dispatcher_with(config, MockNetwork::up(), None)
}

fn wire_types(d: &Dispatcher) -> Vec<PacketType> {
    d.link()
        .transport()
        .packets()
        .iter()
        .map(|p| p.packet_type())
        .collect()
}

// ── Identity ──────────────────────────────────────────────────

#[test]
fn packets_carry_derived_node_id() {
    let config = line_config();
    let mut d = dispatcher(&config);
    let mut lines = MockLines::new();

    assert_eq!(d.node_id(), NODE_ID);

    lines.activate(BUTTON_0);
    d.tick(&mut lines, 0);

    let packets = d.link().transport().packets();
    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].node_id, NODE_ID);
    assert_eq!(packets[0].payload, Payload::Button { index: 0 });
}

// ── Presence ──────────────────────────────────────────────────

#[test]
fn basket_set_down_with_bounce_reports_one_entry() {
    let config = line_config();
    let mut d = dispatcher(&config);
    let mut lines = MockLines::new();

    d.tick(&mut lines, 0);

    // Basket placed.
    lines.activate(PHOTO);
    let report = d.tick(&mut lines, 1000);
    assert_eq!(report.delivered, 1);

    // Rocks and briefly uncovers the photodiode inside the guard.
    lines.release(PHOTO);
    d.tick(&mut lines, 1200);
    lines.activate(PHOTO);
    d.tick(&mut lines, 1300);
    lines.release(PHOTO);
    d.tick(&mut lines, 1600);

    assert_eq!(wire_types(&d), vec![PacketType::Basket]);
}

#[test]
fn basket_removal_sends_nothing_and_reentry_reports_again() {
    let config = line_config();
    let mut d = dispatcher(&config);
    let mut lines = MockLines::new();

    lines.activate(PHOTO);
    d.tick(&mut lines, 1000);

    // Removed after the guard: the exit is local only.
    lines.release(PHOTO);
    let report = d.tick(&mut lines, 2600);
    assert_eq!(report.emitted, 0);

    lines.activate(PHOTO);
    d.tick(&mut lines, 3000);

    assert_eq!(wire_types(&d), vec![PacketType::Basket, PacketType::Basket]);
}

// ── Buttons and people ────────────────────────────────────────

#[test]
fn held_button_reports_once_per_press() {
    let config = line_config();
    let mut d = dispatcher(&config);
    let mut lines = MockLines::new();

    lines.activate(BUTTON_1);
    for t in 0..10 {
        d.tick(&mut lines, t * 10);
    }
    lines.release(BUTTON_1);
    d.tick(&mut lines, 100);
    lines.activate(BUTTON_1);
    d.tick(&mut lines, 110);

    let payloads: Vec<Payload> = d
        .link()
        .transport()
        .packets()
        .iter()
        .map(|p| p.payload)
        .collect();
    assert_eq!(
        payloads,
        vec![Payload::Button { index: 1 }, Payload::Button { index: 1 }]
    );
}

#[test]
fn exclusive_policy_ignores_second_button_while_first_held() {
    let mut config = line_config();
    config.button_policy = ButtonPolicy::Exclusive;
    let mut d = dispatcher(&config);
    let mut lines = MockLines::new();

    lines.activate(BUTTON_0);
    d.tick(&mut lines, 0);
    lines.activate(BUTTON_1);
    d.tick(&mut lines, 10);

    // Release both; button 1 alone is reported again.
    lines.release(BUTTON_0);
    lines.release(BUTTON_1);
    d.tick(&mut lines, 20);
    lines.activate(BUTTON_1);
    d.tick(&mut lines, 30);

    let payloads: Vec<Payload> = d
        .link()
        .transport()
        .packets()
        .iter()
        .map(|p| p.payload)
        .collect();
    assert_eq!(
        payloads,
        vec![Payload::Button { index: 0 }, Payload::Button { index: 1 }]
    );
}

#[test]
fn simultaneous_events_go_out_in_fixed_order() {
    let config = line_config();
    let mut d = dispatcher(&config);
    let mut lines = MockLines::new();

    lines.activate(PEOPLE);
    lines.activate(BUTTON_1);
    lines.activate(BUTTON_0);
    lines.activate(PHOTO);
    let report = d.tick(&mut lines, 0);

    assert_eq!(report.emitted, 4);
    assert_eq!(report.delivered, 4);
    let payloads: Vec<Payload> = d
        .link()
        .transport()
        .packets()
        .iter()
        .map(|p| p.payload)
        .collect();
    assert_eq!(
        payloads,
        vec![
            Payload::Basket,
            Payload::Button { index: 0 },
            Payload::Button { index: 1 },
            Payload::People,
        ]
    );
}

// ── Motion ────────────────────────────────────────────────────

#[test]
fn continuous_motion_is_rate_limited_by_send_delay() {
    let mut config = line_config();
    config.accelerometer = true;
    let mut d = dispatcher_with(&config, MockNetwork::up(), Some(MockImu::moving()));
    let mut lines = MockLines::new();

    // First tick brings the IMU up; the next 20 each take one sample.
    for t in 0..=20 {
        d.tick(&mut lines, t * 50);
    }

    assert_eq!(d.motion_phase(), Some(MotionPhase::Ready));
    assert_eq!(d.accelerometer_mut().map(|imu| imu.reads), Some(20));

    let packets = d.link().transport().packets();
    assert_eq!(packets.len(), 2);
    match packets[0].payload {
        Payload::Accel(r) => {
            assert_eq!(r.accel, [0.6, 0.0, 1.0]);
            assert_eq!(r.temperature_c, 24.5);
        }
        other => panic!("expected ACCEL, got {:?}", other),
    }
}

#[test]
fn failed_motion_sends_are_dropped_and_the_next_reading_is_fresh() {
    let mut config = line_config();
    config.accelerometer = true;
    let mut d = dispatcher_with(&config, MockNetwork::up(), Some(MockImu::moving()));
    let mut lines = MockLines::new();

    d.tick(&mut lines, 0);
    d.link_mut().transport_mut().failing_writes = 3;

    // Emissions at 50, 550 and 1050 fail; 1550 goes out.
    let mut dropped = 0;
    for t in 1..40 {
        let now = t * 50;
        if now == 1100 {
            if let Some(imu) = d.accelerometer_mut() {
                imu.reading.accel = [0.9, 0.0, 1.0];
            }
        }
        dropped += d.tick(&mut lines, now).dropped;
    }

    assert_eq!(dropped, 3);
    assert_eq!(d.link().stats().failed_sends, 3);
    let packets = d.link().transport().packets();
    assert_eq!(packets.len(), 1);
    match packets[0].payload {
        Payload::Accel(r) => assert_eq!(r.accel, [0.9, 0.0, 1.0]),
        other => panic!("expected ACCEL, got {:?}", other),
    }
}

#[test]
fn imu_at_rest_sends_nothing() {
    let mut config = line_config();
    config.accelerometer = true;
    let mut d = dispatcher_with(&config, MockNetwork::up(), Some(MockImu::at_rest()));
    let mut lines = MockLines::new();

    for t in 0..=20 {
        d.tick(&mut lines, t * 50);
    }

    assert!(d.link().transport().written.is_empty());
}

#[test]
fn unplugged_imu_is_reinitialised() {
    let mut config = line_config();
    config.accelerometer = true;
    let mut d = dispatcher_with(&config, MockNetwork::up(), Some(MockImu::moving()));
    let mut lines = MockLines::new();

    d.tick(&mut lines, 0);
    assert_eq!(d.motion_phase(), Some(MotionPhase::Ready));

    if let Some(imu) = d.accelerometer_mut() {
        imu.present = false;
    }
    d.tick(&mut lines, 50);
    assert_eq!(d.motion_phase(), Some(MotionPhase::Uninit));

    if let Some(imu) = d.accelerometer_mut() {
        imu.present = true;
    }
    d.tick(&mut lines, 100);
    assert_eq!(d.motion_phase(), Some(MotionPhase::Ready));
}

#[test]
fn accelerometer_disabled_in_config_ignores_imu() {
    let config = line_config();
    let mut d = dispatcher_with(&config, MockNetwork::up(), Some(MockImu::moving()));
    let mut lines = MockLines::new();

    d.tick(&mut lines, 0);
    assert_eq!(d.motion_phase(), None);
    assert!(d.accelerometer_mut().is_none());
}

// ── Link behaviour ────────────────────────────────────────────

#[test]
fn failed_writes_are_not_retried() {
    let config = line_config();
    let mut d = dispatcher(&config);
    let mut lines = MockLines::new();

    d.tick(&mut lines, 0);
    d.link_mut().transport_mut().failing_writes = 3;

    lines.activate(PHOTO);
    lines.activate(BUTTON_0);
    lines.activate(PEOPLE);
    let report = d.tick(&mut lines, 10);
    assert_eq!(report.emitted, 3);
    assert_eq!(report.dropped, 3);
    assert_eq!(report.delivered, 0);

    // Nothing new happened; nothing is resent.
    let report = d.tick(&mut lines, 20);
    assert_eq!(report.emitted, 0);
    assert!(d.link().transport().written.is_empty());

    // The next event goes out on its own.
    lines.activate(BUTTON_1);
    d.tick(&mut lines, 30);
    let packets = d.link().transport().packets();
    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].payload, Payload::Button { index: 1 });
    assert_eq!(d.link().stats().failed_sends, 3);
}

#[test]
fn events_while_offline_are_dropped() {
    let config = line_config();
    let mut d = dispatcher_with(&config, MockNetwork::down(), None);
    let mut lines = MockLines::new();

    lines.activate(BUTTON_0);
    let report = d.tick(&mut lines, 0);
    assert_eq!(report.link, LinkCheck::Offline);
    assert_eq!(report.dropped, 1);
    assert_eq!(d.link().transport().connects, 0);

    // Network comes back; the held button is not replayed.
    d.link_mut().network_mut().up = true;
    let report = d.tick(&mut lines, 10);
    assert_eq!(report.link, LinkCheck::Established);
    assert_eq!(report.emitted, 0);
    assert!(d.link().transport().written.is_empty());
}

#[test]
fn mac_is_announced_at_the_start_of_every_session() {
    let mut config = line_config();
    config.announce_mac_on_connect = true;
    let mut d = dispatcher(&config);
    let mut lines = MockLines::new();

    d.tick(&mut lines, 0);
    d.tick(&mut lines, 10);

    // Bridge drops the stream; the next session announces again.
    d.link_mut().transport_mut().open = false;
    d.tick(&mut lines, 20);

    let packets = d.link().transport().packets();
    assert_eq!(packets.len(), 2);
    assert!(packets.iter().all(|p| p.payload == Payload::Mac(MAC)));
    assert_eq!(d.link().stats().sessions, 2);
}

#[test]
fn mac_is_not_announced_by_default() {
    let config = line_config();
    let mut d = dispatcher(&config);
    let mut lines = MockLines::new();

    let report = d.tick(&mut lines, 0);
    assert_eq!(report.link, LinkCheck::Established);
    assert_eq!(report.emitted, 0);
}
