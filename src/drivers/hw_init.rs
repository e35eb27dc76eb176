//! One-shot GPIO initialization and raw pin access.
//!
//! Configures input and output directions using raw ESP-IDF sys calls.
//! Called once from `main()` before the control loop starts; the
//! configured pin set comes from [`NodeConfig`](crate::config::NodeConfig).
//!
//! On host builds every pin is backed by an atomic level so tests can
//! drive inputs and observe outputs.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed { pin: i32, rc: i32 },
    InvalidPin(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed { pin, rc } => write!(f, "GPIO{} config failed (rc={})", pin, rc),
            Self::InvalidPin(pin)              => write!(f, "GPIO{} does not exist", pin),
        }
    }
}

/// ESP32-S3 exposes GPIO0..=GPIO48.
pub const GPIO_COUNT: usize = 49;

fn check_pin(pin: i32) -> Result<(), HwInitError> {
    if pin < 0 || pin as usize >= GPIO_COUNT {
        return Err(HwInitError::InvalidPin(pin));
    }
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

/// Configure `pins` as inputs. With `pull_up` the internal pull-up is
/// enabled (active-low wiring); otherwise the pull-down is.
#[cfg(target_os = "espidf")]
pub fn init_inputs(pins: impl IntoIterator<Item = i32>, pull_up: bool) -> Result<(), HwInitError> {
    let mut count = 0;
    for pin in pins {
        check_pin(pin)?;
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: if pull_up { gpio_pullup_t_GPIO_PULLUP_ENABLE } else { gpio_pullup_t_GPIO_PULLUP_DISABLE },
            pull_down_en: if pull_up { gpio_pulldown_t_GPIO_PULLDOWN_DISABLE } else { gpio_pulldown_t_GPIO_PULLDOWN_ENABLE },
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: called once from the single-threaded boot path.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed { pin, rc: ret }); }
        count += 1;
    }
    log::info!("hw_init: {} GPIO inputs configured", count);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_inputs(pins: impl IntoIterator<Item = i32>, _pull_up: bool) -> Result<(), HwInitError> {
    for pin in pins {
        check_pin(pin)?;
    }
    log::info!("hw_init(sim): input config skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim::level(pin)
}

// ── GPIO Outputs ──────────────────────────────────────────────

/// Configure `pin` as a push-pull output, driven low.
#[cfg(target_os = "espidf")]
pub fn init_output(pin: i32) -> Result<(), HwInitError> {
    check_pin(pin)?;
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: called once from the single-threaded boot path.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed { pin, rc: ret }); }
    unsafe { gpio_set_level(pin, 0) };
    log::info!("hw_init: GPIO{} output configured", pin);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_output(pin: i32) -> Result<(), HwInitError> {
    check_pin(pin)?;
    sim::set_level(pin, false);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_output(). Main-loop only.
    unsafe { gpio_set_level(pin, if high { 1 } else { 0 }); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    sim::set_level(pin, high);
}

// ── Simulation pin bank ──────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, Ordering};

    use super::GPIO_COUNT;

    // Pull-ups idle high.
    static LEVELS: [AtomicBool; GPIO_COUNT] = [const { AtomicBool::new(true) }; GPIO_COUNT];

    pub(super) fn level(pin: i32) -> bool {
        usize::try_from(pin)
            .ok()
            .and_then(|i| LEVELS.get(i))
            .is_none_or(|l| l.load(Ordering::Relaxed))
    }

    pub(super) fn set_level(pin: i32, high: bool) {
        if let Some(l) = usize::try_from(pin).ok().and_then(|i| LEVELS.get(i)) {
            l.store(high, Ordering::Relaxed);
        }
    }
}

/// Simulation: drive the electrical level seen on `pin`.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_level(pin: i32, high: bool) {
    sim::set_level(pin, high);
}
