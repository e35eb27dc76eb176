//! Application core: detector orchestration with no direct I/O.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod dispatcher;
pub mod events;
pub mod ports;
