//! Play commands and transport control
//!
//! `play_single_track` and `play_playlist` fetch through the gateway without
//! holding the engine lock, then apply their result only if no newer command
//! replaced `current` in the meantime.

use super::core::{discard_stale, EngineState, PlaybackEngine};
use crate::error::{Error, Result};
use crate::playback::types::{PlaybackContext, QueueItem};
use riffle_common::events::{QueueChangeTrigger, RiffleEvent};
use riffle_common::{PlaylistId, TrackId};
use tracing::{debug, info};

impl PlaybackEngine {
    /// Resolve a track and play it, discarding the whole window
    ///
    /// [API] POST /playback/track
    pub async fn play_single_track(&self, track_id: &TrackId) -> Result<()> {
        info!("Play track command received: {}", track_id);
        discard_stale(self.play_single_track_inner(track_id).await)
    }

    async fn play_single_track_inner(&self, track_id: &TrackId) -> Result<()> {
        let ticket = self.begin_request().await;

        let track = self
            .gateway
            .get_track(track_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Track {}", track_id)))?;

        let mut s = self.inner.lock().await;
        Self::check_ticket(&s, ticket)?;

        let old_state = s.playback_state();
        let autoplay = Self::autoplay_for(&s, ticket);

        let mut next = s.window.clone();
        next.reset_single(QueueItem::from_track(track));
        self.commit_window(&mut s, next, QueueChangeTrigger::Reset, false)
            .await?;

        s.context = PlaybackContext::Single;
        s.pager.stop();
        s.reset_epoch += 1;

        let played = self.start_output(&mut s, autoplay);
        self.finish(&s, old_state);
        played
    }

    /// Play a playlist from `start_order`, discarding the whole window
    ///
    /// Fetches one page; the rest of the page becomes the playlist queue and
    /// further pages are fetched in the background as it drains.
    ///
    /// [API] POST /playback/playlist
    pub async fn play_playlist(&self, playlist_id: &PlaylistId, start_order: u32) -> Result<()> {
        info!(
            "Play playlist command received: {} from order {}",
            playlist_id, start_order
        );
        discard_stale(self.play_playlist_inner(playlist_id, start_order).await)
    }

    async fn play_playlist_inner(&self, playlist_id: &PlaylistId, start_order: u32) -> Result<()> {
        let ticket = self.begin_request().await;

        let page = self
            .gateway
            .get_playlist_page(playlist_id, start_order, self.settings.page_size)
            .await?;
        let delivered = page.len();
        let mut items = page.into_iter().map(QueueItem::from_playlist_entry);
        let Some(first) = items.next() else {
            return Err(Error::Empty(format!(
                "Playlist {} has no entries from order {}",
                playlist_id, start_order
            )));
        };

        let mut s = self.inner.lock().await;
        Self::check_ticket(&s, ticket)?;

        let old_state = s.playback_state();
        let autoplay = Self::autoplay_for(&s, ticket);

        let mut next = s.window.clone();
        next.reset_playlist(first, items);
        self.commit_window(&mut s, next, QueueChangeTrigger::Reset, false)
            .await?;

        s.context = PlaybackContext::Playlist(playlist_id.clone());
        s.reset_epoch += 1;
        let session = s.pager.start(playlist_id.clone(), start_order, delivered);
        debug!(
            "Playlist session {} started, {} entries delivered",
            session, delivered
        );

        let played = self.start_output(&mut s, autoplay);
        self.maybe_refill(&mut s);
        self.finish(&s, old_state);
        played
    }

    /// Pause the output
    ///
    /// Allowed in every state. A pause that arrives while a play command is
    /// still fetching makes that command load its track paused.
    ///
    /// [API] POST /playback/pause
    pub async fn pause(&self) -> Result<()> {
        info!("Pause command received");
        let mut s = self.inner.lock().await;
        let old_state = s.playback_state();
        self.pause_locked(&mut s);
        self.finish(&s, old_state);
        Ok(())
    }

    /// Resume the output
    ///
    /// [API] POST /playback/resume
    pub async fn resume(&self) -> Result<()> {
        info!("Resume command received");
        let mut s = self.inner.lock().await;
        let old_state = s.playback_state();
        let result = self.resume_locked(&mut s);
        self.finish(&s, old_state);
        result
    }

    /// Flip between playing and paused
    ///
    /// [API] POST /playback/toggle
    pub async fn toggle_play(&self) -> Result<()> {
        let mut s = self.inner.lock().await;
        let old_state = s.playback_state();
        let result = if s.is_playing {
            self.pause_locked(&mut s);
            Ok(())
        } else {
            self.resume_locked(&mut s)
        };
        self.finish(&s, old_state);
        result
    }

    fn pause_locked(&self, s: &mut EngineState) {
        s.transport.pause();
        s.is_playing = false;
        s.intent_epoch += 1;
    }

    fn resume_locked(&self, s: &mut EngineState) -> Result<()> {
        if s.window.current().is_none() {
            return Err(Error::InvalidState("Nothing loaded to resume".to_string()));
        }
        s.intent_epoch += 1;
        s.transport.play()?;
        s.is_playing = true;
        Ok(())
    }

    /// Move the playhead of the current item
    ///
    /// Negative targets clamp to 0; once the output has reported a duration,
    /// targets past it clamp to the duration. Returns the position the output
    /// accepted, which also becomes the reported progress.
    ///
    /// [API] POST /playback/seek
    pub async fn seek(&self, position_ms: i64) -> Result<u64> {
        info!("Seek command received: {}ms", position_ms);
        let mut s = self.inner.lock().await;
        let Some(track_id) = s.window.current().map(|c| c.track_id().clone()) else {
            return Err(Error::InvalidState("Nothing loaded to seek".to_string()));
        };

        let mut target = position_ms.max(0) as u64;
        if s.duration_ms > 0 {
            target = target.min(s.duration_ms);
        }
        let accepted = s.transport.seek_to(target);
        if accepted != target {
            debug!("Output adjusted seek {}ms -> {}ms", target, accepted);
        }
        s.position_ms = accepted;

        self.state.broadcast_event(RiffleEvent::PlaybackProgress {
            track_id,
            position_ms: accepted,
            duration_ms: s.duration_ms,
            timestamp: chrono::Utc::now(),
        });
        let old_state = s.playback_state();
        self.finish(&s, old_state);
        Ok(accepted)
    }

    /// Set output volume on the 0-100 scale
    ///
    /// The value is passed through unchanged; the output applies it as a
    /// 0.0-1.0 gain.
    ///
    /// [API] POST /audio/volume
    pub async fn set_volume(&self, volume: u8) -> Result<()> {
        info!("Volume command received: {}", volume);
        let mut s = self.inner.lock().await;
        let old_volume = s.volume;
        s.transport.set_volume(volume);
        s.volume = volume;

        self.state.broadcast_event(RiffleEvent::VolumeChanged {
            old_volume,
            new_volume: volume,
            timestamp: chrono::Utc::now(),
        });
        let old_state = s.playback_state();
        self.finish(&s, old_state);
        Ok(())
    }

    pub async fn volume(&self) -> u8 {
        self.inner.lock().await.volume
    }
}
