//! Smart basket node firmware library.
//!
//! Exposes the detector, protocol, and link logic for integration
//! testing and for the bridge-side decoder. All ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod detectors;
pub mod drivers;
pub mod error;
pub mod halt;
pub mod link;
pub mod pins;
pub mod protocol;

pub use error::{Error, Result};
