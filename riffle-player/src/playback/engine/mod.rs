//! Playback engine
//!
//! **Module Structure:**
//! - `core.rs`: construction, lifecycle, output notifications, shared transition helpers
//! - `playback.rs`: play commands and transport control (pause, seek, volume)
//! - `queue.rs`: forward/backward skips and queue editing
//! - `prefetch.rs`: background playlist page refills

mod core;
mod playback;
mod prefetch;
mod queue;

pub use self::core::PlaybackEngine;
