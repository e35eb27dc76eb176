//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`]: the hexagonal boundary for network
//! association. The link manager polls it once per tick while the
//! network is down; nothing here blocks.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! An association attempt that has not produced an IP address within
//! [`ASSOCIATION_TIMEOUT_MS`] is abandoned. After a failed or lost
//! association the adapter waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) before retrying.

use core::fmt;
use log::{info, warn};

use crate::app::ports::ConnectivityPort;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    DriverFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::DriverFailed => write!(f, "WiFi driver call failed"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    /// Driver started, no attempt made yet.
    Idle,
    Connecting { started_at: u32 },
    Connected,
    /// Waiting out the backoff before retry number `attempt` (1-based,
    /// reset once associated).
    Reconnecting { attempt: u32, since: u32 },
}

/// Give up on an association attempt after this long.
pub const ASSOCIATION_TIMEOUT_MS: u32 = 10_000;
const INITIAL_BACKOFF_MS: u32 = 2_000;
const MAX_BACKOFF_MS: u32 = 60_000;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Simulation link state
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_LINK_UP: core::sync::atomic::AtomicBool = core::sync::atomic::AtomicBool::new(true);

/// Simulation: control whether the simulated access point accepts us.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_link(up: bool) {
    SIM_LINK_UP.store(up, core::sync::atomic::Ordering::Relaxed);
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    backoff_ms: u32,
    /// Retries since the last successful association.
    retries: u32,
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: EspWifi<'static>) -> Self {
        Self {
            state: WifiState::Idle,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff_ms: INITIAL_BACKOFF_MS,
            retries: 0,
            wifi,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            state: WifiState::Idle,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff_ms: INITIAL_BACKOFF_MS,
            retries: 0,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    /// Configure the station and start the driver. The station MAC is
    /// readable from this point on.
    pub fn start(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        self.platform_start()?;
        info!("WiFi: driver started");
        Ok(())
    }

    fn begin_attempt(&mut self, now_ms: u32) {
        info!("WiFi: associating with '{}'", self.ssid);
        match self.platform_connect() {
            Ok(()) => self.state = WifiState::Connecting { started_at: now_ms },
            Err(e) => {
                warn!("WiFi: connect request failed: {}", e);
                self.enter_backoff(now_ms);
            }
        }
    }

    fn enter_backoff(&mut self, now_ms: u32) {
        self.retries = self.retries.saturating_add(1);
        self.state = WifiState::Reconnecting {
            attempt: self.retries,
            since: now_ms,
        };
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), ConnectivityError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let configuration = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        self.wifi.set_configuration(&configuration).map_err(|e| {
            log::error!("WiFi: set_configuration failed: {:?}", e);
            ConnectivityError::DriverFailed
        })?;
        self.wifi.start().map_err(|e| {
            log::error!("WiFi: start failed: {:?}", e);
            ConnectivityError::DriverFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), ConnectivityError> {
        info!("WiFi(sim): driver started");
        Ok(())
    }

    /// Request association. Returns immediately; completion is observed
    /// through [`platform_is_connected`](Self::platform_is_connected).
    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        self.wifi.connect().map_err(|e| {
            log::debug!("WiFi: connect() returned {:?}", e);
            ConnectivityError::DriverFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        let _ = self.wifi.disconnect();
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {}

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false) && self.wifi.sta_netif().is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        SIM_LINK_UP.load(core::sync::atomic::Ordering::Relaxed)
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn poll(&mut self, now_ms: u32) {
        match self.state {
            WifiState::Idle => {
                if self.ssid.is_empty() {
                    return;
                }
                self.begin_attempt(now_ms);
            }
            WifiState::Connecting { started_at } => {
                if self.platform_is_connected() {
                    self.state = WifiState::Connected;
                    self.backoff_ms = INITIAL_BACKOFF_MS;
                    self.retries = 0;
                    info!("WiFi: associated, network up");
                } else if now_ms.wrapping_sub(started_at) > ASSOCIATION_TIMEOUT_MS {
                    warn!("WiFi: association timed out, retrying in {} ms", self.backoff_ms);
                    self.platform_disconnect();
                    self.enter_backoff(now_ms);
                }
            }
            WifiState::Connected => {
                if !self.platform_is_connected() {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.enter_backoff(now_ms);
                }
            }
            WifiState::Reconnecting { attempt, since } => {
                if now_ms.wrapping_sub(since) < self.backoff_ms {
                    return;
                }
                info!("WiFi: reconnect attempt {} (backoff {} ms)", attempt, self.backoff_ms);
                self.backoff_ms = self.backoff_ms.saturating_mul(2).min(MAX_BACKOFF_MS);
                self.begin_attempt(now_ms);
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
