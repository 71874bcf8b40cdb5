//! Queue operations module
//!
//! **Responsibilities:**
//! - Forward and backward skips through the play window
//! - Jumping to an item already queued
//! - Priority-queue insertion, removal and clearing
//! - QueueChanged event emission

use super::core::PlaybackEngine;
use crate::error::{Error, Result};
use crate::playback::types::{PlaybackContext, QueueItem};
use riffle_common::events::QueueChangeTrigger;
use riffle_common::TrackId;
use tracing::{debug, info};
use uuid::Uuid;

impl PlaybackEngine {
    /// Skip forward
    ///
    /// Priority queue first, then playlist queue. When both are empty the
    /// engine stays on the current item and pauses; that is not an error.
    ///
    /// [API] POST /playback/next
    pub async fn advance(&self) -> Result<()> {
        info!("Skip next command received");
        let mut s = self.inner.lock().await;
        let old_state = s.playback_state();
        let result = self.advance_locked(&mut s, false).await;
        self.finish(&s, old_state);
        result
    }

    /// Skip backward
    ///
    /// Pops the most recently played item. The item it replaces returns to
    /// the front of its forward queue unless that track is already queued.
    /// With no history the engine pauses instead.
    ///
    /// [API] POST /playback/previous
    pub async fn retreat(&self) -> Result<()> {
        info!("Skip previous command received");
        let mut s = self.inner.lock().await;
        let old_state = s.playback_state();

        let mut next = s.window.clone();
        if !next.retreat(s.context.playlist_id()) {
            info!("No previous item, pausing");
            s.transport.pause();
            s.is_playing = false;
            self.finish(&s, old_state);
            return Ok(());
        }

        let result = match self
            .commit_window(&mut s, next, QueueChangeTrigger::Retreat, false)
            .await
        {
            Ok(()) => self.start_output(&mut s, true),
            Err(e) => Err(e),
        };
        self.finish(&s, old_state);
        result
    }

    /// Play a queued track, consuming everything queued before it
    ///
    /// Falls back to `play_single_track` when the track is not queued.
    ///
    /// [API] POST /playback/queue/play
    pub async fn play_from_queue(&self, track_id: &TrackId) -> Result<()> {
        info!("Play from queue command received: {}", track_id);
        let mut s = self.inner.lock().await;
        let old_state = s.playback_state();

        let mut next = s.window.clone();
        let Some(jump) = next.jump_to(track_id) else {
            drop(s);
            debug!("Track {} not queued, playing it directly", track_id);
            return self.play_single_track(track_id).await;
        };
        debug!(
            "Jumping into {:?} queue, {} entries skipped",
            jump.origin, jump.skipped
        );

        let result = match self
            .commit_window(&mut s, next, QueueChangeTrigger::Jump, false)
            .await
        {
            Ok(()) => {
                let played = self.start_output(&mut s, true);
                self.maybe_refill(&mut s);
                played
            }
            Err(e) => Err(e),
        };
        self.finish(&s, old_state);
        result
    }

    /// Resolve a track and append it to the priority queue
    ///
    /// Never interrupts the current item. Returns the new entry id, or None
    /// when a play command or `clear_queue` discarded the queues while the
    /// track was being resolved.
    ///
    /// [API] POST /playback/queue/enqueue
    pub async fn enqueue_priority(&self, track_id: &TrackId) -> Result<Option<Uuid>> {
        info!("Enqueue command received: {}", track_id);
        let issued = self.inner.lock().await.reset_epoch;

        let track = self
            .gateway
            .get_track(track_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Track {}", track_id)))?;

        let mut s = self.inner.lock().await;
        if s.reset_epoch != issued {
            debug!(
                "Discarding enqueue of {}: queues reset while resolving (epoch {}, now {})",
                track_id, issued, s.reset_epoch
            );
            return Ok(None);
        }

        let item = QueueItem::from_track(track);
        let entry_id = item.entry_id();

        let old_state = s.playback_state();
        s.window.push_priority(item);
        self.emit_queue_changed(&s, QueueChangeTrigger::UserEnqueue);
        self.finish(&s, old_state);

        info!("Enqueued {} as entry {}", track_id, entry_id);
        Ok(Some(entry_id))
    }

    /// Remove a pending entry from either forward queue
    ///
    /// [API] DELETE /playback/queue/:entry_id
    pub async fn remove_from_queue(&self, entry_id: Uuid) -> Result<()> {
        info!("Remove queue entry command received: {}", entry_id);
        let mut s = self.inner.lock().await;
        let old_state = s.playback_state();

        if s.window.remove(entry_id).is_none() {
            return Err(Error::NotFound(format!("Queue entry {}", entry_id)));
        }

        self.emit_queue_changed(&s, QueueChangeTrigger::UserDequeue);
        self.maybe_refill(&mut s);
        self.finish(&s, old_state);
        Ok(())
    }

    /// Empty both forward queues and stop playlist pagination
    ///
    /// The current item and the history are kept.
    ///
    /// [API] POST /playback/queue/clear
    pub async fn clear_queue(&self) -> Result<()> {
        info!("Clear queue command received");
        let mut s = self.inner.lock().await;
        let old_state = s.playback_state();

        s.window.clear_forward();
        s.pager.stop();
        s.context = PlaybackContext::Single;
        s.reset_epoch += 1;

        self.emit_queue_changed(&s, QueueChangeTrigger::Clear);
        self.finish(&s, old_state);
        Ok(())
    }

    /// Number of pending items across both forward queues
    pub async fn queue_len(&self) -> usize {
        let s = self.inner.lock().await;
        s.window.priority().len() + s.window.playlist().len()
    }
}

