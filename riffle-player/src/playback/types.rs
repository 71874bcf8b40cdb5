//! Queue item and playback context types

use riffle_common::{PlaylistEntry, PlaylistId, Track, TrackId};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// One item of the play window
///
/// Either a bare track (played directly or user-enqueued) or a track that was
/// delivered by playlist pagination and still knows its playlist position.
#[derive(Debug, Clone)]
pub enum QueueItem {
    Track {
        entry_id: Uuid,
        track: Arc<Track>,
    },
    PlaylistEntry {
        entry_id: Uuid,
        playlist_id: PlaylistId,
        order: u32,
        track: Arc<Track>,
    },
}

impl QueueItem {
    pub fn from_track(track: Track) -> Self {
        QueueItem::Track {
            entry_id: Uuid::new_v4(),
            track: Arc::new(track),
        }
    }

    pub fn from_playlist_entry(entry: PlaylistEntry) -> Self {
        QueueItem::PlaylistEntry {
            entry_id: Uuid::new_v4(),
            playlist_id: entry.playlist_id,
            order: entry.order,
            track: Arc::new(entry.track),
        }
    }

    pub fn entry_id(&self) -> Uuid {
        match self {
            QueueItem::Track { entry_id, .. } | QueueItem::PlaylistEntry { entry_id, .. } => *entry_id,
        }
    }

    pub fn track(&self) -> &Track {
        match self {
            QueueItem::Track { track, .. } | QueueItem::PlaylistEntry { track, .. } => track,
        }
    }

    pub fn track_id(&self) -> &TrackId {
        &self.track().id
    }

    pub fn playlist_id(&self) -> Option<&PlaylistId> {
        match self {
            QueueItem::PlaylistEntry { playlist_id, .. } => Some(playlist_id),
            QueueItem::Track { .. } => None,
        }
    }

    /// Position within the source playlist, for playlist-sourced items
    pub fn order(&self) -> Option<u32> {
        match self {
            QueueItem::PlaylistEntry { order, .. } => Some(*order),
            QueueItem::Track { .. } => None,
        }
    }

    pub fn info(&self) -> QueueItemInfo {
        QueueItemInfo {
            entry_id: self.entry_id(),
            track: self.track().clone(),
            playlist_id: self.playlist_id().cloned(),
            order: self.order(),
        }
    }
}

/// Which part of the window supplied the current item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Set directly by play-track / play-playlist
    Direct,
    Priority,
    Playlist,
    /// Popped off the back-stack
    Previous,
}

/// Whether forward advance drives playlist pagination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "kind", content = "playlist_id", rename_all = "lowercase")]
pub enum PlaybackContext {
    #[default]
    Single,
    Playlist(PlaylistId),
}

impl PlaybackContext {
    pub fn playlist_id(&self) -> Option<&PlaylistId> {
        match self {
            PlaybackContext::Playlist(id) => Some(id),
            PlaybackContext::Single => None,
        }
    }
}

/// Serializable view of a queue item for presentation clients
#[derive(Debug, Clone, Serialize)]
pub struct QueueItemInfo {
    pub entry_id: Uuid,
    pub track: Track,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<PlaylistId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}
