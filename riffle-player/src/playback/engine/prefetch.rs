//! Background playlist refills
//!
//! When the playlist queue drains to the low-water mark the engine asks the
//! gateway for the next contiguous order range. The fetch runs in its own
//! task so the advance that triggered it never waits on the network. Results
//! are applied only if the playlist session that asked for them is still
//! active; failures are logged and leave the queue under-filled.

use super::core::{EngineState, PlaybackEngine};
use crate::playback::pager::RefillRequest;
use crate::playback::types::QueueItem;
use riffle_common::events::{QueueChangeTrigger, RiffleEvent};
use tracing::{debug, info, warn};

impl PlaybackEngine {
    /// Spawn a refill if the playlist queue is at or below the low-water mark
    ///
    /// At most one refill per playlist session is in flight.
    pub(super) fn maybe_refill(&self, s: &mut EngineState) {
        if s.context.playlist_id().is_none() {
            return;
        }
        let Some(request) = s.pager.refill_request(s.window.playlist().len()) else {
            return;
        };

        debug!(
            "Requesting playlist {} entries {}..{}",
            request.playlist_id,
            request.offset,
            request.offset.saturating_add(request.limit)
        );

        let self_clone = self.clone_handles();
        let handle = tokio::spawn(async move {
            self_clone.run_refill(request).await;
        });
        let mut slot = self
            .refill_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(handle);
    }

    async fn run_refill(&self, request: RefillRequest) {
        let result = self
            .gateway
            .get_playlist_page(&request.playlist_id, request.offset, request.limit)
            .await;

        let mut s = self.inner.lock().await;
        let entries = match result {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Playlist {} refill at offset {} failed: {}",
                    request.playlist_id, request.offset, e
                );
                s.pager.fail(request.session_id);
                return;
            }
        };

        let count = entries.len();
        if !s.pager.complete(request.session_id, count) {
            debug!(
                "Dropping refill for playlist {} (session {} no longer active)",
                request.playlist_id, request.session_id
            );
            return;
        }

        s.window
            .append_playlist(entries.into_iter().map(QueueItem::from_playlist_entry));
        info!(
            "Playlist {} refilled: {} entries from order {}",
            request.playlist_id, count, request.offset
        );

        self.state.broadcast_event(RiffleEvent::PlaylistRefilled {
            playlist_id: request.playlist_id.clone(),
            offset: request.offset,
            count,
            timestamp: chrono::Utc::now(),
        });
        self.emit_queue_changed(&s, QueueChangeTrigger::Refill);
        let state_now = s.playback_state();
        self.finish(&s, state_now);
    }

    /// Wait for the most recently spawned refill to finish
    pub async fn wait_for_prefetch(&self) {
        let handle = self
            .refill_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Refill task failed: {}", e);
            }
        }
    }

    /// True while a playlist refill is in flight
    pub async fn is_refill_in_flight(&self) -> bool {
        self.inner.lock().await.pager.is_in_flight()
    }
}
