//! MPU-6050 6-axis IMU driver (GY-521 breakout).
//!
//! Generic over any `embedded_hal::i2c::I2c` bus and `DelayNs` source, so
//! the same driver runs on the ESP-IDF I2C master and on a mock bus in
//! tests.
//!
//! ## Configuration
//!
//! | Register      | Value | Meaning                  |
//! |---------------|-------|--------------------------|
//! | PWR_MGMT_1    | 0x00  | wake, internal 8 MHz clk |
//! | ACCEL_CONFIG  | 0x00  | ±2 g, 16384 LSB/g        |
//! | GYRO_CONFIG   | 0x00  | ±250 °/s, 131 LSB/(°/s)  |
//!
//! A sample is one 14-byte burst from ACCEL_XOUT_H: accel xyz, temperature,
//! gyro xyz, each a big-endian `i16`.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, I2c};

use crate::app::ports::AccelerometerPort;
use crate::error::SensorError;
use crate::protocol::packet::MotionReading;

// ── Registers ─────────────────────────────────────────────────

const REG_GYRO_CONFIG: u8 = 0x1B;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;

const WHO_AM_I_VALUE: u8 = 0x68;

const ACCEL_LSB_PER_G: f32 = 16_384.0;
const GYRO_LSB_PER_DPS: f32 = 131.0;

/// Samples averaged during calibration.
const CALIBRATION_SAMPLES: u32 = 50;
const CALIBRATION_SPACING_MS: u32 = 2;

pub struct Mpu6050<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    initialised: bool,
    accel_offset: [f32; 3],
    gyro_offset: [f32; 3],
}

impl<I2C: I2c, D: DelayNs> Mpu6050<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            initialised: false,
            accel_offset: [0.0; 3],
            gyro_offset: [0.0; 3],
        }
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c.write(self.address, &[reg, value]).map_err(bus_error)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(bus_error)?;
        Ok(buf[0])
    }

    fn check_identity(&mut self) -> Result<(), SensorError> {
        match self.read_reg(REG_WHO_AM_I)? {
            WHO_AM_I_VALUE => Ok(()),
            other => Err(SensorError::WrongDevice(other)),
        }
    }

    /// One burst read, converted to physical units, without offsets.
    fn read_raw(&mut self) -> Result<MotionReading, SensorError> {
        let mut buf = [0u8; 14];
        self.i2c
            .write_read(self.address, &[REG_ACCEL_XOUT_H], &mut buf)
            .map_err(bus_error)?;

        let word = |i: usize| f32::from(i16::from_be_bytes([buf[i], buf[i + 1]]));
        Ok(MotionReading {
            accel: [
                word(0) / ACCEL_LSB_PER_G,
                word(2) / ACCEL_LSB_PER_G,
                word(4) / ACCEL_LSB_PER_G,
            ],
            temperature_c: word(6) / 340.0 + 36.53,
            gyro: [
                word(8) / GYRO_LSB_PER_DPS,
                word(10) / GYRO_LSB_PER_DPS,
                word(12) / GYRO_LSB_PER_DPS,
            ],
        })
    }
}

fn bus_error(e: impl embedded_hal::i2c::Error) -> SensorError {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => SensorError::NotResponding,
        _ => SensorError::BusFault,
    }
}

impl<I2C: I2c, D: DelayNs> AccelerometerPort for Mpu6050<I2C, D> {
    fn init(&mut self) -> Result<(), SensorError> {
        self.initialised = false;
        self.write_reg(REG_PWR_MGMT_1, 0x00)?;
        self.check_identity()?;
        self.write_reg(REG_ACCEL_CONFIG, 0x00)?;
        self.write_reg(REG_GYRO_CONFIG, 0x00)?;
        self.accel_offset = [0.0; 3];
        self.gyro_offset = [0.0; 3];
        self.initialised = true;
        log::info!("Mpu6050: initialised at 0x{:02X}", self.address);
        Ok(())
    }

    /// Average [`CALIBRATION_SAMPLES`] readings at rest. The resting Z
    /// axis is expected to read +1 g.
    fn calibrate(&mut self) -> Result<(), SensorError> {
        if !self.initialised {
            return Err(SensorError::NotInitialised);
        }

        let mut accel_sum = [0.0f32; 3];
        let mut gyro_sum = [0.0f32; 3];
        for _ in 0..CALIBRATION_SAMPLES {
            let r = self.read_raw()?;
            for axis in 0..3 {
                accel_sum[axis] += r.accel[axis];
                gyro_sum[axis] += r.gyro[axis];
            }
            self.delay.delay_ms(CALIBRATION_SPACING_MS);
        }

        let n = CALIBRATION_SAMPLES as f32;
        self.accel_offset = [accel_sum[0] / n, accel_sum[1] / n, accel_sum[2] / n - 1.0];
        self.gyro_offset = [gyro_sum[0] / n, gyro_sum[1] / n, gyro_sum[2] / n];
        log::info!(
            "Mpu6050: calibrated, accel offset [{:.3}, {:.3}, {:.3}] g",
            self.accel_offset[0],
            self.accel_offset[1],
            self.accel_offset[2]
        );
        Ok(())
    }

    fn available(&mut self) -> bool {
        self.initialised && self.check_identity().is_ok()
    }

    fn read(&mut self) -> Result<MotionReading, SensorError> {
        if !self.initialised {
            return Err(SensorError::NotInitialised);
        }
        let mut r = self.read_raw()?;
        for axis in 0..3 {
            r.accel[axis] -= self.accel_offset[axis];
            r.gyro[axis] -= self.gyro_offset[axis];
        }
        Ok(r)
    }
}
