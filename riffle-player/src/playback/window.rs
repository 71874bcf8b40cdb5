//! Play window
//!
//! Tracks which items are where relative to the audio output:
//! - `previous`: back-stack of played items, most recent at the tail, capped
//!   at `HISTORY_LIMIT` (oldest dropped first)
//! - `current`: the item loaded into the output
//! - `priority`: user-enqueued tracks, always drained first
//! - `playlist`: tracks delivered by playlist pagination, in playlist order
//!
//! All operations here are pure bookkeeping. The engine applies them to a
//! clone of its window and only commits the clone once the transport has
//! accepted the new current item.

use super::types::{Origin, QueueItem};
use riffle_common::{PlaylistId, TrackId};
use std::collections::VecDeque;
use uuid::Uuid;

/// Most items kept on the back-stack
pub const HISTORY_LIMIT: usize = 200;

#[derive(Debug, Clone)]
struct Current {
    item: QueueItem,
    origin: Origin,
}

/// Result of a forward step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A new item became current; `origin` names the queue it came from
    Moved { origin: Origin },
    /// Both forward queues were empty; nothing changed
    Exhausted,
}

/// Result of jumping to an item already queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jump {
    pub origin: Origin,
    /// Queue entries moved onto `previous` (the old current not included)
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PlayWindow {
    previous: Vec<QueueItem>,
    current: Option<Current>,
    priority: VecDeque<QueueItem>,
    playlist: VecDeque<QueueItem>,
}

impl PlayWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full reset to a single directly played item
    pub fn reset_single(&mut self, item: QueueItem) {
        self.previous.clear();
        self.priority.clear();
        self.playlist.clear();
        self.current = Some(Current {
            item,
            origin: Origin::Direct,
        });
    }

    /// Full reset to the first page of a playlist
    pub fn reset_playlist(&mut self, first: QueueItem, rest: impl IntoIterator<Item = QueueItem>) {
        self.reset_single(first);
        self.playlist.extend(rest);
    }

    /// Step forward: priority head first, then playlist head
    ///
    /// The old current (if any) is pushed onto `previous`.
    pub fn advance(&mut self) -> Advance {
        let (next, origin) = if let Some(item) = self.priority.pop_front() {
            (item, Origin::Priority)
        } else if let Some(item) = self.playlist.pop_front() {
            (item, Origin::Playlist)
        } else {
            return Advance::Exhausted;
        };

        self.retire_current();
        self.current = Some(Current { item: next, origin });
        Advance::Moved { origin }
    }

    /// Step backward: pop the back-stack into current
    ///
    /// The old current goes back to the front of a forward queue unless its
    /// track is already queued. A playlist entry from `active_playlist` returns
    /// to the playlist queue; anything else returns to the priority queue.
    /// Returns false (and changes nothing) when `previous` is empty.
    pub fn retreat(&mut self, active_playlist: Option<&PlaylistId>) -> bool {
        let Some(prev) = self.previous.pop() else {
            return false;
        };

        if let Some(old) = self.current.take() {
            let track_id = old.item.track_id().clone();
            if !self.is_queued(&track_id) {
                let belongs_to_playlist = matches!(
                    (old.item.playlist_id(), active_playlist),
                    (Some(item_pl), Some(active)) if item_pl == active
                );
                if belongs_to_playlist {
                    self.playlist.push_front(old.item);
                } else {
                    self.priority.push_front(old.item);
                }
            }
        }

        self.current = Some(Current {
            item: prev,
            origin: Origin::Previous,
        });
        true
    }

    /// Make the first queued item with `track_id` current
    ///
    /// Everything queued before the match is moved onto `previous` in play
    /// order. A match in the playlist queue flushes the whole priority queue
    /// first. Returns None (and changes nothing) when the track is not queued.
    pub fn jump_to(&mut self, track_id: &TrackId) -> Option<Jump> {
        if let Some(idx) = self.priority.iter().position(|i| i.track_id() == track_id) {
            self.retire_current();
            let skipped: Vec<QueueItem> = self.priority.drain(..idx).collect();
            let item = self.priority.pop_front()?;
            let count = skipped.len();
            self.push_history(skipped);
            self.current = Some(Current {
                item,
                origin: Origin::Priority,
            });
            return Some(Jump {
                origin: Origin::Priority,
                skipped: count,
            });
        }

        let idx = self.playlist.iter().position(|i| i.track_id() == track_id)?;
        self.retire_current();
        let flushed = self.priority.len() + idx;
        let skipped: Vec<QueueItem> = self
            .priority
            .drain(..)
            .chain(self.playlist.drain(..idx))
            .collect();
        self.push_history(skipped);
        let item = self.playlist.pop_front()?;
        self.current = Some(Current {
            item,
            origin: Origin::Playlist,
        });
        Some(Jump {
            origin: Origin::Playlist,
            skipped: flushed,
        })
    }

    pub fn push_priority(&mut self, item: QueueItem) {
        self.priority.push_back(item);
    }

    pub fn append_playlist(&mut self, items: impl IntoIterator<Item = QueueItem>) {
        self.playlist.extend(items);
    }

    /// Remove a pending item from either forward queue
    pub fn remove(&mut self, entry_id: Uuid) -> Option<QueueItem> {
        if let Some(idx) = self.priority.iter().position(|i| i.entry_id() == entry_id) {
            return self.priority.remove(idx);
        }
        let idx = self.playlist.iter().position(|i| i.entry_id() == entry_id)?;
        self.playlist.remove(idx)
    }

    /// Drop both forward queues; previous and current are kept
    pub fn clear_forward(&mut self) {
        self.priority.clear();
        self.playlist.clear();
    }

    pub fn current(&self) -> Option<&QueueItem> {
        self.current.as_ref().map(|c| &c.item)
    }

    pub fn current_origin(&self) -> Option<Origin> {
        self.current.as_ref().map(|c| c.origin)
    }

    pub fn previous(&self) -> &[QueueItem] {
        &self.previous
    }

    pub fn priority(&self) -> &VecDeque<QueueItem> {
        &self.priority
    }

    pub fn playlist(&self) -> &VecDeque<QueueItem> {
        &self.playlist
    }

    /// True if `track_id` is waiting in either forward queue
    pub fn is_queued(&self, track_id: &TrackId) -> bool {
        self.priority
            .iter()
            .chain(self.playlist.iter())
            .any(|i| i.track_id() == track_id)
    }

    fn retire_current(&mut self) {
        if let Some(old) = self.current.take() {
            self.push_history([old.item]);
        }
    }

    fn push_history(&mut self, items: impl IntoIterator<Item = QueueItem>) {
        self.previous.extend(items);
        let excess = self.previous.len().saturating_sub(HISTORY_LIMIT);
        if excess > 0 {
            self.previous.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riffle_common::{Artist, ArtistId, PlaylistEntry, Track};

    fn track(id: &str) -> Track {
        Track {
            id: TrackId::from(id),
            title: format!("Track {}", id),
            artist: Artist {
                id: ArtistId::from("a1"),
                name: "Artist".to_string(),
                image_url: None,
                description: None,
            },
            duration_ms: 180_000,
            cover_url: String::new(),
            manifest_url: format!("https://cdn.example/{}.m3u8", id),
            lyrics: None,
        }
    }

    fn single(id: &str) -> QueueItem {
        QueueItem::from_track(track(id))
    }

    fn entry(playlist: &str, order: u32) -> QueueItem {
        QueueItem::from_playlist_entry(PlaylistEntry {
            playlist_id: PlaylistId::from(playlist),
            order,
            track: track(&format!("{}-{}", playlist, order)),
        })
    }

    fn playlist_window(len: u32) -> PlayWindow {
        let mut window = PlayWindow::new();
        window.reset_playlist(entry("p", 0), (1..len).map(|o| entry("p", o)));
        window
    }

    fn ids(items: impl IntoIterator<Item = QueueItem>) -> Vec<String> {
        items.into_iter().map(|i| i.track_id().to_string()).collect()
    }

    #[test]
    fn test_new_window_is_idle() {
        let window = PlayWindow::new();
        assert!(window.current().is_none());
        assert!(window.previous().is_empty());
        assert!(window.priority().is_empty());
        assert!(window.playlist().is_empty());
    }

    #[test]
    fn test_priority_drains_before_playlist() {
        let mut window = playlist_window(3);
        window.push_priority(single("x"));
        window.push_priority(single("y"));

        assert_eq!(window.advance(), Advance::Moved { origin: Origin::Priority });
        assert_eq!(window.current().unwrap().track_id(), &TrackId::from("x"));
        assert_eq!(window.advance(), Advance::Moved { origin: Origin::Priority });
        assert_eq!(window.advance(), Advance::Moved { origin: Origin::Playlist });
        assert_eq!(window.current().unwrap().order(), Some(1));
        assert_eq!(ids(window.previous().iter().cloned()), vec!["p-0", "x", "y"]);
    }

    #[test]
    fn test_advance_past_end_keeps_last_current() {
        let mut window = playlist_window(2);
        assert_eq!(window.advance(), Advance::Moved { origin: Origin::Playlist });
        assert_eq!(window.advance(), Advance::Exhausted);
        assert_eq!(window.advance(), Advance::Exhausted);

        assert_eq!(window.current().unwrap().order(), Some(1));
        assert_eq!(window.previous().len(), 1);
    }

    #[test]
    fn test_reset_single_discards_queues() {
        let mut window = playlist_window(5);
        window.push_priority(single("x"));
        window.advance();

        window.reset_single(single("solo"));
        assert!(window.previous().is_empty());
        assert!(window.priority().is_empty());
        assert!(window.playlist().is_empty());
        assert_eq!(window.current_origin(), Some(Origin::Direct));
    }

    #[test]
    fn test_jump_into_playlist_flushes_priority() {
        let mut window = playlist_window(6);
        window.push_priority(single("x"));
        window.push_priority(single("y"));

        // playlist queue is p-1..p-5; p-3 sits at index 2
        let jump = window.jump_to(&TrackId::from("p-3")).unwrap();
        assert_eq!(jump, Jump { origin: Origin::Playlist, skipped: 4 });
        assert_eq!(ids(window.previous().iter().cloned()), vec!["p-0", "x", "y", "p-1", "p-2"]);
        assert_eq!(ids(window.playlist().iter().cloned()), vec!["p-4", "p-5"]);
        assert!(window.priority().is_empty());
    }

    #[test]
    fn test_jump_into_priority_keeps_playlist() {
        let mut window = playlist_window(3);
        window.push_priority(single("x"));
        window.push_priority(single("y"));
        window.push_priority(single("z"));

        let jump = window.jump_to(&TrackId::from("y")).unwrap();
        assert_eq!(jump, Jump { origin: Origin::Priority, skipped: 1 });
        assert_eq!(ids(window.priority().iter().cloned()), vec!["z"]);
        assert_eq!(window.playlist().len(), 2);
    }

    #[test]
    fn test_jump_to_unknown_changes_nothing() {
        let mut window = playlist_window(3);
        assert!(window.jump_to(&TrackId::from("missing")).is_none());
        assert_eq!(window.current().unwrap().order(), Some(0));
        assert_eq!(window.playlist().len(), 2);
    }

    #[test]
    fn test_retreat_returns_playlist_entry_to_playlist_front() {
        let mut window = playlist_window(4);
        window.advance();
        let active = PlaylistId::from("p");

        assert!(window.retreat(Some(&active)));
        assert_eq!(window.current().unwrap().order(), Some(0));
        assert_eq!(window.current_origin(), Some(Origin::Previous));
        assert_eq!(ids(window.playlist().iter().cloned()), vec!["p-1", "p-2", "p-3"]);
        assert!(window.priority().is_empty());
    }

    #[test]
    fn test_retreat_pushes_direct_track_to_priority() {
        let mut window = PlayWindow::new();
        window.reset_single(single("a"));
        window.push_priority(single("b"));
        window.advance();

        assert!(window.retreat(None));
        assert_eq!(window.current().unwrap().track_id(), &TrackId::from("a"));
        assert_eq!(ids(window.priority().iter().cloned()), vec!["b"]);
    }

    #[test]
    fn test_retreat_does_not_duplicate_queued_track() {
        let mut window = PlayWindow::new();
        window.reset_single(single("a"));
        window.push_priority(single("b"));
        window.advance();
        // Same track enqueued again while it is playing
        window.push_priority(single("b"));

        assert!(window.retreat(None));
        assert_eq!(ids(window.priority().iter().cloned()), vec!["b"]);
    }

    #[test]
    fn test_retreat_with_empty_history() {
        let mut window = playlist_window(2);
        assert!(!window.retreat(None));
        assert_eq!(window.current().unwrap().order(), Some(0));
    }

    #[test]
    fn test_remove_by_entry_id() {
        let mut window = playlist_window(3);
        window.push_priority(single("x"));
        let target = window.playlist()[1].entry_id();

        let removed = window.remove(target).unwrap();
        assert_eq!(removed.order(), Some(2));
        assert_eq!(window.playlist().len(), 1);
        assert!(window.remove(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_history_drops_oldest_past_limit() {
        let mut window = playlist_window(HISTORY_LIMIT as u32 + 6);
        while let Advance::Moved { .. } = window.advance() {}

        assert_eq!(window.previous().len(), HISTORY_LIMIT);
        assert_eq!(window.previous()[0].order(), Some(5));
        assert_eq!(window.current().unwrap().order(), Some(HISTORY_LIMIT as u32 + 5));
    }
}
