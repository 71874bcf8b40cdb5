//! Event types for the riffle event stream
//!
//! Events are broadcast by the playback engine and serialized for SSE
//! transmission. All externally visible notifications use this enum so
//! listeners can match exhaustively.

use crate::model::{PlaylistId, TrackId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Riffle event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RiffleEvent {
    /// Playback state changed (Idle / Paused / Playing)
    ///
    /// Triggers:
    /// - SSE: Update transport controls
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A queue item became current and its manifest was loaded
    TrackStarted {
        /// Queue entry that became current
        entry_id: Uuid,
        track_id: TrackId,
        /// Set when the item came from playlist pagination
        playlist_id: Option<PlaylistId>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The previous current item left the output
    ///
    /// `completed` is true only when the audio output reported end of resource;
    /// skips, jumps and resets report false.
    TrackCompleted {
        entry_id: Uuid,
        track_id: TrackId,
        position_ms: u64,
        completed: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Forward queues changed
    QueueChanged {
        /// Priority queue track ids, head first
        priority: Vec<TrackId>,
        /// Playlist queue track ids, head first
        playlist: Vec<TrackId>,
        /// Why the queues changed
        trigger: QueueChangeTrigger,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback progress update
    ///
    /// Emitted on every position notification from the audio output and
    /// once after a seek.
    PlaybackProgress {
        track_id: TrackId,
        position_ms: u64,
        duration_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Volume changed (0-100 user scale)
    VolumeChanged {
        old_volume: u8,
        new_volume: u8,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A background page fetch appended entries to the playlist queue
    PlaylistRefilled {
        playlist_id: PlaylistId,
        /// First order value requested
        offset: u32,
        /// Entries appended (0 means the playlist is exhausted)
        count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl RiffleEvent {
    /// Event name used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            RiffleEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            RiffleEvent::TrackStarted { .. } => "TrackStarted",
            RiffleEvent::TrackCompleted { .. } => "TrackCompleted",
            RiffleEvent::QueueChanged { .. } => "QueueChanged",
            RiffleEvent::PlaybackProgress { .. } => "PlaybackProgress",
            RiffleEvent::VolumeChanged { .. } => "VolumeChanged",
            RiffleEvent::PlaylistRefilled { .. } => "PlaylistRefilled",
        }
    }
}

/// Playback state enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing loaded
    Idle,
    /// Current item loaded, output paused
    Paused,
    /// Current item loaded, output playing
    Playing,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "Idle"),
            PlaybackState::Paused => write!(f, "Paused"),
            PlaybackState::Playing => write!(f, "Playing"),
        }
    }
}

/// Why the forward queues changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum QueueChangeTrigger {
    /// play-track / play-playlist replaced everything
    Reset,
    UserEnqueue,
    UserDequeue,
    /// Forward skip or end of resource
    Advance,
    /// Backward skip
    Retreat,
    /// Jump to an item already in the queue
    Jump,
    /// Background playlist page appended
    Refill,
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = RiffleEvent::PlaylistRefilled {
            playlist_id: PlaylistId::from("p1"),
            offset: 10,
            count: 10,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PlaylistRefilled");
        assert_eq!(json["playlist_id"], "p1");
        assert_eq!(json["offset"], 10);
        assert_eq!(event.event_type(), "PlaylistRefilled");
    }

    #[test]
    fn test_playback_state_lowercase_on_the_wire() {
        let json = serde_json::to_string(&PlaybackState::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
        assert_eq!(PlaybackState::Playing.to_string(), "Playing");
    }
}
