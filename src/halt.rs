//! Last-resort safe state.
//!
//! When boot cannot bring up something the node is useless without (GPIO,
//! the WiFi driver), the firmware parks here instead of returning an
//! error. The device stays alive and diagnosable: the reason is logged,
//! the watchdog keeps being fed so the node does not reboot-loop, and a
//! caller-supplied background task (e.g. flushing the log) keeps running.

use std::time::Duration;

use crate::drivers::watchdog::Watchdog;

/// Interval between background service calls while halted.
pub const HALT_SERVICE_INTERVAL: Duration = Duration::from_millis(1000);

/// Log `reason` and never return.
pub fn safe_halt(reason: &str, watchdog: &Watchdog, mut service: impl FnMut()) -> ! {
    log::error!("Halt: {}; node parked, servicing background tasks only", reason);
    loop {
        watchdog.feed();
        service();
        std::thread::sleep(HALT_SERVICE_INTERVAL);
    }
}
