//! Telemetry protocol: packet types, encoder, streaming decoder, and the
//! transport abstraction the link writes through.
//!
//! ```text
//! ┌────────────┐   ┌──────────┐   ┌─────────────┐   ┌───────────┐
//! │ Dispatcher │──▶│  Packet  │──▶│ LinkManager │──▶│ Transport │ ──▶ bridge
//! │  (events)  │   │ (encode) │   │             │   │  (trait)  │
//! └────────────┘   └──────────┘   └─────────────┘   └───────────┘
//!                                                         │
//!                       bridge side: PacketDecoder ◀──────┘
//! ```

pub mod decoder;
pub mod packet;
pub mod transport;
