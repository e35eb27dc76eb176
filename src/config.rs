//! Node configuration.
//!
//! All tunable parameters for the basket node. The defaults are the
//! production constants; the bridge endpoint and WiFi credentials are
//! baked in at build time from `BASKET_*` environment variables.
//!
//! The set of configured pins doubles as the capability set: a detector
//! exists only when its peripheral has a pin (or, for the accelerometer,
//! the `accelerometer` flag) configured.

use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pins;

/// Maximum photodiode lines feeding the presence detector.
pub const MAX_PHOTODIODES: usize = 4;
/// Maximum buttons in the button group.
pub const MAX_BUTTONS: usize = 8;

const BRIDGE_HOST: &str = match option_env!("BASKET_BRIDGE_HOST") {
    Some(host) => host,
    None => "192.168.4.1",
};
const BRIDGE_PORT: u16 = match option_env!("BASKET_BRIDGE_PORT") {
    Some(port) => parse_port(port),
    None => 9000,
};
const WIFI_SSID: &str = match option_env!("BASKET_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "smart-basket-bridge",
};
const WIFI_PASSWORD: &str = match option_env!("BASKET_WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};

/// Where the bridge listens. `host` must be an IP literal: the node
/// never performs DNS lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeEndpoint {
    pub host: heapless::String<64>,
    pub port: u16,
}

impl BridgeEndpoint {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: bounded(host),
            port,
        }
    }

    /// The socket address, or `None` if `host` is not an IP literal.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        let ip: IpAddr = self.host.parse().ok()?;
        Some(SocketAddr::new(ip, self.port))
    }
}

impl core::fmt::Display for BridgeEndpoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// How presses on different buttons interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ButtonPolicy {
    /// Every button debounces on its own; every press is reported.
    #[default]
    Independent,
    /// At most one button is considered held at a time; presses on other
    /// buttons are ignored until it is released.
    Exclusive,
}

/// Core node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Network ---
    pub bridge: BridgeEndpoint,
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
    /// Upper bound on one connect attempt (milliseconds).
    pub connect_timeout_ms: u32,
    /// Send a MAC packet at the start of every bridge session.
    pub announce_mac_on_connect: bool,

    // --- Inputs ---
    /// Inputs read low when active (pull-up wiring).
    pub lines_active_low: bool,
    /// Photodiode lines; the basket counts as present when all are active.
    pub presence_pins: heapless::Vec<i32, MAX_PHOTODIODES>,
    /// Button lines; the position in this list is the reported index.
    pub button_pins: heapless::Vec<i32, MAX_BUTTONS>,
    pub button_policy: ButtonPolicy,
    pub people_pin: Option<i32>,
    /// An MPU-6050 is fitted on the I²C bus.
    pub accelerometer: bool,

    // --- Timing ---
    /// Minimum dwell in PRESENT before a basket exit is accepted.
    pub bounce_guard_ms: u32,
    /// Minimum spacing between accelerometer reads.
    pub motion_sample_interval_ms: u32,
    /// Minimum spacing between emitted motion packets.
    pub motion_send_delay_ms: u32,
    /// Movement threshold on the X and Y axes (g).
    pub motion_threshold_g: f32,

    // --- Housekeeping ---
    pub activity_led_pin: Option<i32>,
    pub activity_led_hold_ms: u32,
    /// Ticks slower than this are logged as overruns.
    pub tick_budget_ms: u32,
    pub watchdog_timeout_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let mut presence_pins = heapless::Vec::new();
        let _ = presence_pins.push(pins::PHOTO_DIODE_0_GPIO);

        Self {
            // Network
            bridge: BridgeEndpoint::new(BRIDGE_HOST, BRIDGE_PORT),
            wifi_ssid: bounded(WIFI_SSID),
            wifi_password: bounded(WIFI_PASSWORD),
            connect_timeout_ms: 250,
            announce_mac_on_connect: false,

            // Inputs
            lines_active_low: true,
            presence_pins,
            button_pins: heapless::Vec::new(),
            button_policy: ButtonPolicy::Independent,
            people_pin: None,
            accelerometer: true,

            // Timing
            bounce_guard_ms: 1500,
            motion_sample_interval_ms: 50,
            motion_send_delay_ms: 500,
            motion_threshold_g: 0.25,

            // Housekeeping
            activity_led_pin: Some(pins::ACTIVITY_LED_GPIO),
            activity_led_hold_ms: 100,
            tick_budget_ms: 250,
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl NodeConfig {
    /// Reject values the control loop cannot run with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.bridge.socket_addr().is_none() {
            return invalid("bridge host must be an IP address");
        }
        if self.bridge.port == 0 {
            return invalid("bridge port must be non-zero");
        }
        if self.connect_timeout_ms == 0 {
            return invalid("connect timeout must be non-zero");
        }
        if self.motion_sample_interval_ms == 0 {
            return invalid("motion sample interval must be non-zero");
        }
        if self.motion_send_delay_ms < self.motion_sample_interval_ms {
            return invalid("motion send delay must not be shorter than the sample interval");
        }
        if !(self.motion_threshold_g.is_finite() && self.motion_threshold_g > 0.0) {
            return invalid("motion threshold must be a positive number");
        }
        if self.watchdog_timeout_ms <= self.tick_budget_ms {
            return invalid("watchdog timeout must exceed the tick budget");
        }
        if self.has_duplicate_pins() {
            return invalid("an input pin is assigned twice");
        }
        Ok(())
    }

    fn has_duplicate_pins(&self) -> bool {
        let mut seen: heapless::Vec<i32, { MAX_PHOTODIODES + MAX_BUTTONS + 4 }> = heapless::Vec::new();
        let i2c = self
            .accelerometer
            .then_some([pins::I2C_SDA_GPIO, pins::I2C_SCL_GPIO]);
        let all = self
            .presence_pins
            .iter()
            .copied()
            .chain(self.button_pins.iter().copied())
            .chain(self.people_pin)
            .chain(self.activity_led_pin)
            .chain(i2c.into_iter().flatten());
        for pin in all {
            if seen.contains(&pin) {
                return true;
            }
            let _ = seen.push(pin);
        }
        false
    }

    /// Every input pin the detectors will read, for GPIO setup.
    pub fn input_pins(&self) -> impl Iterator<Item = i32> + '_ {
        self.presence_pins
            .iter()
            .chain(self.button_pins.iter())
            .chain(self.people_pin.iter())
            .copied()
    }
}

fn invalid(rule: &'static str) -> crate::Result<()> {
    Err(ConfigError::ValidationFailed(rule).into())
}

/// Copy `s` into a fixed-capacity string, truncating on a char boundary.
fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

const fn parse_port(s: &str) -> u16 {
    let bytes = s.as_bytes();
    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        assert!(digit.is_ascii_digit(), "BASKET_BRIDGE_PORT must be a decimal number");
        value = value * 10 + (digit - b'0') as u32;
        assert!(value <= u16::MAX as u32, "BASKET_BRIDGE_PORT out of range");
        i += 1;
    }
    value as u16
}
