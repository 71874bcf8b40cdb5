//! Audio output and adaptive transport
//!
//! **Module Structure:**
//! - `output.rs`: `AudioOutput` contract and the notifications it emits
//! - `transport.rs`: `TransportSession`, the single long-lived wrapper the engine drives
//! - `clock.rs`: clock-driven output used by the service binary
//! - `manifest.rs`: HLS manifest probing (authoritative duration)

pub mod clock;
pub mod manifest;
pub mod output;
pub mod transport;

pub use clock::ClockOutput;
pub use output::{AudioOutput, OutputEvent};
pub use transport::TransportSession;
