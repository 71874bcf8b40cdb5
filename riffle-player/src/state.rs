//! Shared playback state
//!
//! Read side of the engine for presentation clients: a broadcast channel of
//! `RiffleEvent`s and a watch channel holding the latest `PlayerSnapshot`.
//! Only the engine publishes; everyone else subscribes.

use crate::playback::types::{Origin, PlaybackContext, QueueItemInfo};
use riffle_common::events::RiffleEvent;
use serde::Serialize;
use tokio::sync::{broadcast, watch};

pub use riffle_common::events::PlaybackState;

/// Everything a presentation client needs to render the player
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub is_playing: bool,
    pub current: Option<QueueItemInfo>,
    pub current_origin: Option<Origin>,
    /// Back-stack, oldest first
    pub previous: Vec<QueueItemInfo>,
    pub priority_queue: Vec<QueueItemInfo>,
    pub playlist_queue: Vec<QueueItemInfo>,
    pub progress_ms: u64,
    /// Authoritative length reported by the audio output (0 until known)
    pub duration_ms: u64,
    /// 0-100
    pub volume: u8,
    pub context: PlaybackContext,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            state: PlaybackState::Idle,
            is_playing: false,
            current: None,
            current_origin: None,
            previous: Vec::new(),
            priority_queue: Vec::new(),
            playlist_queue: Vec::new(),
            progress_ms: 0,
            duration_ms: 0,
            volume: 75,
            context: PlaybackContext::Single,
        }
    }
}

/// Shared state accessible by the engine and the HTTP layer
pub struct SharedState {
    event_tx: broadcast::Sender<RiffleEvent>,
    snapshot_tx: watch::Sender<PlayerSnapshot>,
}

impl SharedState {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100); // Buffer up to 100 events
        let (snapshot_tx, _) = watch::channel(PlayerSnapshot::default());
        Self {
            event_tx,
            snapshot_tx,
        }
    }

    /// Broadcast an event to all SSE listeners
    pub fn broadcast_event(&self, event: RiffleEvent) {
        // No receivers is OK
        let _ = self.event_tx.send(event);
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RiffleEvent> {
        self.event_tx.subscribe()
    }

    /// Replace the published snapshot
    pub fn publish_snapshot(&self, snapshot: PlayerSnapshot) {
        self.snapshot_tx.send_replace(snapshot);
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshot_tx.borrow().clone()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
