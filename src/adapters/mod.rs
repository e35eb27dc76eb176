//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements        | Connects to              |
//! |-----------------|-------------------|--------------------------|
//! | `device_id`     | (free functions)  | eFuse station MAC        |
//! | `gpio_lines`    | LinePort          | ESP32 GPIO inputs        |
//! | `tcp_transport` | StreamTransport   | TCP client over lwIP     |
//! | `time`          | Clock             | ESP32 system timer       |
//! | `wifi`          | ConnectivityPort  | ESP-IDF WiFi STA         |
//!
//! The accelerometer port is implemented by the
//! [`Mpu6050`](crate::drivers::mpu6050::Mpu6050) driver directly.

pub mod device_id;
pub mod gpio_lines;
pub mod tcp_transport;
pub mod time;
pub mod wifi;
