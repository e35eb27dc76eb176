//! GPIO / peripheral pin assignments for the basket node board.
//!
//! Single source of truth for the defaults in [`NodeConfig`](crate::config::NodeConfig).
//! Every input below is active-low: the photodiode pulls the line low when
//! the beam is interrupted, buttons short to ground.

// ---------------------------------------------------------------------------
// Basket presence (photodiode beam sensors)
// ---------------------------------------------------------------------------

/// Photodiode under the rim.
pub const PHOTO_DIODE_0_GPIO: i32 = 5;
/// Second photodiode (optional, unpopulated on most boards).
pub const PHOTO_DIODE_1_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// User buttons
// ---------------------------------------------------------------------------

pub const CUSTOM_BUTTON_0_GPIO: i32 = 7;
pub const CUSTOM_BUTTON_1_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// People sensor (PIR module, open-drain output)
// ---------------------------------------------------------------------------

pub const PEOPLE_SENSOR_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// I²C bus (MPU-6050 accelerometer)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
/// MPU-6050 with AD0 tied low.
pub const ACCELEROMETER_I2C_ADDR: u8 = 0x68;
pub const I2C_BAUDRATE_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// Activity LED
// ---------------------------------------------------------------------------

/// Lit briefly after every packet that reaches the bridge.
pub const ACTIVITY_LED_GPIO: i32 = 2;
