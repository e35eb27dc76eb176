//! Task Watchdog Timer (TWDT) driver and per-tick time budget.
//!
//! [`Watchdog`] wraps the ESP-IDF TWDT API to reset the device if the
//! control loop stalls for longer than the configured timeout. The loop
//! must call `feed()` on every tick.
//!
//! [`TickBudget`] is the soft limit below that: a tick slower than the
//! budget is logged and counted, but nothing is reset.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK as i32 {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK as i32;
                if subscribed {
                    info!("Watchdog: subscribed ({} ms timeout, panic on trigger)", timeout_ms);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self { subscribed }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("Watchdog(sim): no-op ({} ms)", timeout_ms);
            Self {}
        }
    }

    /// Feed the watchdog. Must be called at least once per timeout period.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}

/// Soft deadline for one control-loop tick.
#[derive(Debug, Clone, Copy)]
pub struct TickBudget {
    budget_ms: u32,
    overruns: u32,
    worst_ms: u32,
}

impl TickBudget {
    pub fn new(budget_ms: u32) -> Self {
        Self {
            budget_ms,
            overruns: 0,
            worst_ms: 0,
        }
    }

    /// Record a finished tick. Returns `true` if it overran.
    pub fn check(&mut self, started_ms: u32, finished_ms: u32) -> bool {
        let elapsed = finished_ms.wrapping_sub(started_ms);
        self.worst_ms = self.worst_ms.max(elapsed);
        if elapsed <= self.budget_ms {
            return false;
        }
        self.overruns = self.overruns.wrapping_add(1);
        log::warn!(
            "Loop: tick took {} ms (budget {} ms, {} overruns)",
            elapsed,
            self.budget_ms,
            self.overruns
        );
        true
    }

    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    pub fn worst_ms(&self) -> u32 {
        self.worst_ms
    }
}
