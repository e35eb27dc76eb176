//! Node identity derived from the WiFi station MAC address.
//!
//! The node id is a 32-bit value computed once at boot:
//!
//! 1. SHA-1 over the 6 raw MAC bytes (20-byte digest).
//! 2. Fold the digest into 4 bytes: `acc[i % 4] ^= digest[i]`.
//! 3. Interpret the 4 bytes as a little-endian `u32`.
//!
//! The same MAC always yields the same id, across reboots and firmware
//! versions, so the bridge can key per-basket state on it. Distinct MACs
//! are not guaranteed distinct ids; see the collision test below.

use sha1::{Digest, Sha1};

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// 32-bit node identifier carried in every packet header.
pub type NodeId = u32;

/// Read the WiFi station MAC address.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> crate::Result<MacAddress> {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: `mac` is a valid 6-byte buffer, which is what the station
    // MAC type requires.
    esp_idf_svc::sys::esp!(unsafe {
        esp_idf_svc::sys::esp_read_mac(
            mac.as_mut_ptr(),
            esp_idf_svc::sys::esp_mac_type_t_ESP_MAC_WIFI_STA,
        )
    })
    .map_err(|e| {
        log::error!("DeviceId: esp_read_mac failed: {:?}", e);
        crate::Error::Init("station MAC unavailable")
    })?;
    Ok(mac)
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> crate::Result<MacAddress> {
    Ok([0x5C, 0xCF, 0x7F, 0x12, 0x34, 0x56])
}

/// Fold a SHA-1 digest into a node id.
pub fn fold_digest(digest: &[u8; 20]) -> NodeId {
    let mut acc = [0u8; 4];
    for (i, byte) in digest.iter().enumerate() {
        acc[i % 4] ^= byte;
    }
    u32::from_le_bytes(acc)
}

/// Derive the node id for `mac`.
pub fn node_id(mac: &MacAddress) -> NodeId {
    let digest: [u8; 20] = Sha1::digest(mac).into();
    fold_digest(&digest)
}

/// DHCP hostname from the last 3 MAC bytes.
/// Format: `basket-xxyyzz` (lowercase).
pub fn hostname(mac: &MacAddress) -> heapless::String<24> {
    let mut name = heapless::String::<24>::new();
    use core::fmt::Write;
    let _ = write!(name, "basket-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    name
}
