//! Basket node firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioLines    WifiAdapter      TcpTransport    Esp32Time       │
//! │  (LinePort)   (Connectivity)   (Stream)        (Clock)         │
//! │  Mpu6050 (AccelerometerPort)   ActivityLed     Watchdog        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          EventDispatcher (pure logic)                  │    │
//! │  │  LinkManager · DetectorSet · MotionSampler             │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Single cooperative loop · TickBudget · safe_halt              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;

use basketnode::adapters::device_id;
use basketnode::adapters::gpio_lines::GpioLines;
use basketnode::adapters::tcp_transport::TcpTransport;
use basketnode::adapters::time::Esp32TimeAdapter;
use basketnode::adapters::wifi::WifiAdapter;
use basketnode::app::dispatcher::EventDispatcher;
use basketnode::app::ports::Clock;
use basketnode::config::NodeConfig;
use basketnode::drivers::activity_led::ActivityLed;
use basketnode::drivers::hw_init;
use basketnode::drivers::mpu6050::Mpu6050;
use basketnode::drivers::watchdog::{TickBudget, Watchdog};
use basketnode::halt::safe_halt;
use basketnode::link::LinkManager;
use basketnode::pins;

/// Loop pacing; long enough to let the idle task run.
const LOOP_DELAY_MS: u32 = 1;

// The I2C driver takes typed pin singletons; keep them in step with `pins`.
const _: () = assert!(pins::I2C_SDA_GPIO == 8 && pins::I2C_SCL_GPIO == 9);

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  BasketNode v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = NodeConfig::default();
    config.validate()?;

    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 3. Input lines ────────────────────────────────────────
    if let Err(e) = hw_init::init_inputs(config.input_pins(), config.lines_active_low) {
        safe_halt(&format!("GPIO init failed: {e}"), &watchdog, || {});
    }

    // ── 4. WiFi station ───────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let esp_wifi = match EspWifi::new(peripherals.modem, sysloop, Some(nvs)) {
        Ok(w) => w,
        Err(e) => safe_halt(&format!("WiFi driver unavailable: {e}"), &watchdog, || {}),
    };
    let mut wifi = WifiAdapter::new(esp_wifi);
    if let Err(e) = wifi
        .set_credentials(&config.wifi_ssid, &config.wifi_password)
        .and_then(|()| wifi.start())
    {
        safe_halt(&format!("WiFi start failed: {e}"), &watchdog, || {});
    }

    // ── 5. Identity ───────────────────────────────────────────
    let mac = device_id::read_mac()?;
    let node_id = device_id::node_id(&mac);
    info!(
        "Node ID: 0x{:08X} (hostname: {})",
        node_id,
        device_id::hostname(&mac)
    );

    // ── 6. Accelerometer ──────────────────────────────────────
    let accel = if config.accelerometer {
        let i2c_config = I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ));
        match I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio8, // pins::I2C_SDA_GPIO
            peripherals.pins.gpio9, // pins::I2C_SCL_GPIO
            &i2c_config,
        ) {
            Ok(i2c) => Some(Mpu6050::new(i2c, FreeRtos, pins::ACCELEROMETER_I2C_ADDR)),
            Err(e) => {
                warn!("I2C init failed ({}), motion disabled", e);
                None
            }
        }
    } else {
        None
    };

    // ── 7. Link + dispatcher ──────────────────────────────────
    let link = LinkManager::new(
        TcpTransport::new(config.connect_timeout_ms),
        wifi,
        config.bridge.clone(),
    );
    let mut dispatcher = EventDispatcher::new(&config, mac, node_id, link, accel);

    let mut led = config.activity_led_pin.and_then(|pin| {
        ActivityLed::new(pin, config.activity_led_hold_ms)
            .map_err(|e| warn!("Activity LED unavailable: {}", e))
            .ok()
    });

    let clock = Esp32TimeAdapter::new();
    let mut lines = GpioLines::new();
    let mut budget = TickBudget::new(config.tick_budget_ms);

    info!("System ready. Entering control loop.");

    // ── 8. Control loop ───────────────────────────────────────
    loop {
        let started = clock.now_ms();
        dispatcher.tick(&mut lines, started);

        let now = clock.now_ms();
        if let Some(led) = led.as_mut() {
            if dispatcher.link_mut().take_packet_sent() {
                led.pulse(now);
            }
            led.tick(now);
        }

        watchdog.feed();
        budget.check(started, now);

        FreeRtos::delay_ms(LOOP_DELAY_MS);
    }
}
