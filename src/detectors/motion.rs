//! Accelerometer sampling and motion detection.
//!
//! ## States
//!
//! ```text
//!   UNINIT ──init ok──▶ CALIBRATING ──calibrate ok──▶ READY
//!     ▲  │                   │                          │
//!     │  └─init err (retry)  └─calibrate err────────────┤
//!     └────────────── unavailable / read error ◀────────┘
//! ```
//!
//! ## Rate limits
//!
//! Two independent timers bound the work done in READY:
//!
//! | Timer            | Default | Bounds                              |
//! |------------------|---------|-------------------------------------|
//! | sample interval  | 50 ms   | how often the IMU is read           |
//! | send delay       | 500 ms  | how often an ACCEL packet goes out  |
//!
//! A sample counts as motion when `|x| > threshold || |y| > threshold`.
//! Z is excluded: on a flat mount it always carries gravity.

use crate::app::ports::AccelerometerPort;
use crate::config::NodeConfig;
use crate::error::{Error, SensorError};
use crate::protocol::packet::MotionReading;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    Uninit,
    Calibrating,
    Ready,
}

#[derive(Debug, Clone, Copy)]
pub struct MotionConfig {
    pub sample_interval_ms: u32,
    pub send_delay_ms: u32,
    pub threshold_g: f32,
}

impl MotionConfig {
    pub fn from_config(config: &NodeConfig) -> Self {
        Self {
            sample_interval_ms: config.motion_sample_interval_ms,
            send_delay_ms: config.motion_send_delay_ms,
            threshold_g: config.motion_threshold_g,
        }
    }
}

pub struct MotionSampler {
    config: MotionConfig,
    phase: MotionPhase,
    last_sample_at: Option<u32>,
    last_emit_at: Option<u32>,
    last_error: Option<Error>,
}

impl MotionSampler {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            phase: MotionPhase::Uninit,
            last_sample_at: None,
            last_emit_at: None,
            last_error: None,
        }
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    /// Most recent sensor fault, kept until the next one.
    pub fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    fn fault(&mut self, e: SensorError) -> Error {
        let e = Error::from(e);
        self.last_error = Some(e);
        e
    }

    /// Advance the state machine by one tick. Returns a reading when a
    /// motion packet should be sent.
    pub fn poll(&mut self, accel: &mut impl AccelerometerPort, now_ms: u32) -> Option<MotionReading> {
        match self.phase {
            MotionPhase::Uninit => {
                self.try_bring_up(accel);
                None
            }
            // Calibration completes inside try_bring_up. Seeing this phase
            // at the start of a tick means it never finished.
            MotionPhase::Calibrating => {
                self.phase = MotionPhase::Uninit;
                None
            }
            MotionPhase::Ready => self.sample(accel, now_ms),
        }
    }

    fn try_bring_up(&mut self, accel: &mut impl AccelerometerPort) {
        if let Err(e) = accel.init() {
            let e = self.fault(e);
            log::debug!("Motion: init failed: {}", e);
            return;
        }

        self.phase = MotionPhase::Calibrating;
        log::info!("Motion: accelerometer found, calibrating");

        match accel.calibrate() {
            Ok(()) => {
                self.phase = MotionPhase::Ready;
                self.last_sample_at = None;
                log::info!("Motion: ready");
            }
            Err(e) => {
                let e = self.fault(e);
                self.phase = MotionPhase::Uninit;
                log::warn!("Motion: calibration failed: {}", e);
            }
        }
    }

    fn sample(&mut self, accel: &mut impl AccelerometerPort, now_ms: u32) -> Option<MotionReading> {
        if !accel.available() {
            log::warn!("Motion: accelerometer unavailable, re-initialising");
            self.fault(SensorError::NotResponding);
            self.phase = MotionPhase::Uninit;
            return None;
        }

        if let Some(last) = self.last_sample_at {
            if now_ms.wrapping_sub(last) < self.config.sample_interval_ms {
                return None;
            }
        }
        self.last_sample_at = Some(now_ms);

        let reading = match accel.read() {
            Ok(r) => r,
            Err(e) => {
                let e = self.fault(e);
                log::warn!("Motion: read failed ({}), re-initialising", e);
                self.phase = MotionPhase::Uninit;
                return None;
            }
        };

        if !self.is_motion(&reading) {
            return None;
        }
        if let Some(last) = self.last_emit_at {
            if now_ms.wrapping_sub(last) < self.config.send_delay_ms {
                return None;
            }
        }

        self.last_emit_at = Some(now_ms);
        log::debug!(
            "Motion: x={:.2}g y={:.2}g over {:.2}g",
            reading.accel[0],
            reading.accel[1],
            self.config.threshold_g
        );
        Some(reading)
    }

    fn is_motion(&self, reading: &MotionReading) -> bool {
        let t = self.config.threshold_g;
        reading.accel[0].abs() > t || reading.accel[1].abs() > t
    }
}
