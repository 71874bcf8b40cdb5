//! Audio output contract
//!
//! One output exists per process. It is constructed by the caller together
//! with the notification channel and handed to the engine, which becomes its
//! only user.

use crate::error::Result;
use async_trait::async_trait;

/// Notifications from the audio output back into the engine
///
/// Every notification carries the `load_id` of the resource it refers to, so
/// the engine can drop notifications about content that has since been
/// replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    /// Playhead moved
    PositionChanged { load_id: u64, position_ms: u64 },

    /// Real length of the loaded resource became known
    DurationChanged { load_id: u64, duration_ms: u64 },

    /// Playhead reached the end of the loaded resource
    Ended { load_id: u64 },
}

impl OutputEvent {
    pub fn load_id(&self) -> u64 {
        match *self {
            OutputEvent::PositionChanged { load_id, .. }
            | OutputEvent::DurationChanged { load_id, .. }
            | OutputEvent::Ended { load_id } => load_id,
        }
    }
}

/// A single playable device
#[async_trait]
pub trait AudioOutput: Send {
    /// Replace the loaded content with the resource behind `manifest_url`
    ///
    /// Leaves the output paused at position 0. Fails with `Error::Transport`
    /// when the resource cannot be opened.
    async fn load(&mut self, load_id: u64, manifest_url: &str) -> Result<()>;

    /// Start or continue playing the loaded resource
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    /// Move the playhead and return the position actually accepted
    fn seek_to(&mut self, position_ms: u64) -> u64;

    /// Set output gain (0.0-1.0)
    fn set_volume(&mut self, volume: f32);

    fn position_ms(&self) -> u64;

    /// Length of the loaded resource, once known
    fn duration_ms(&self) -> Option<u64>;
}
