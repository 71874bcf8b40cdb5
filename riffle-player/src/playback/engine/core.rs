//! Engine core: state, lifecycle and transition helpers
//!
//! All mutable engine state lives in one `EngineState` behind a single
//! `tokio::sync::Mutex`. Every command and every audio output notification
//! takes that lock for its whole mutation, so there is exactly one writer at
//! a time. Gateway fetches happen *without* the lock; their results are
//! checked against the generation counter before being applied.

use crate::audio::output::{AudioOutput, OutputEvent};
use crate::audio::transport::TransportSession;
use crate::config::EngineSettings;
use crate::error::{Error, Result};
use crate::gateway::DataGateway;
use crate::playback::pager::PlaylistPager;
use crate::playback::types::{Origin, PlaybackContext, QueueItem};
use crate::playback::window::{Advance, PlayWindow};
use crate::state::{PlaybackState, PlayerSnapshot, SharedState};
use riffle_common::events::{QueueChangeTrigger, RiffleEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Mutable engine state, guarded by `PlaybackEngine::inner`
pub(super) struct EngineState {
    pub(super) window: PlayWindow,
    pub(super) context: PlaybackContext,
    pub(super) pager: PlaylistPager,
    pub(super) transport: TransportSession,
    pub(super) is_playing: bool,
    pub(super) position_ms: u64,
    pub(super) duration_ms: u64,
    pub(super) volume: u8,
    /// Bumped by every command that reassigns `current` and by every
    /// fetching play command when it starts
    pub(super) generation: u64,
    /// Bumped by every explicit pause/resume
    pub(super) intent_epoch: u64,
    /// Bumped whenever the forward queues are discarded wholesale
    pub(super) reset_epoch: u64,
}

impl EngineState {
    pub(super) fn playback_state(&self) -> PlaybackState {
        if self.window.current().is_none() {
            PlaybackState::Idle
        } else if self.is_playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.playback_state(),
            is_playing: self.is_playing,
            current: self.window.current().map(QueueItem::info),
            current_origin: self.window.current_origin(),
            previous: self.window.previous().iter().map(QueueItem::info).collect(),
            priority_queue: self.window.priority().iter().map(QueueItem::info).collect(),
            playlist_queue: self.window.playlist().iter().map(QueueItem::info).collect(),
            progress_ms: self.position_ms,
            duration_ms: self.duration_ms,
            volume: self.volume,
            context: self.context.clone(),
        }
    }
}

/// Issued to a fetching command before it leaves the lock
#[derive(Debug, Clone, Copy)]
pub(super) struct RequestTicket {
    pub(super) generation: u64,
    pub(super) intent_epoch: u64,
}

/// Playback engine - owns the play window, the queues and the transport
pub struct PlaybackEngine {
    /// Track and playlist resolution
    pub(super) gateway: Arc<dyn DataGateway>,

    /// Everything mutable
    pub(super) inner: Arc<Mutex<EngineState>>,

    /// Event and snapshot publication
    pub(super) state: Arc<SharedState>,

    pub(super) settings: EngineSettings,

    /// Audio output notifications, taken by the event loop on start
    pub(super) output_events_rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<OutputEvent>>>>,

    /// Most recently spawned playlist refill
    pub(super) refill_task: Arc<std::sync::Mutex<Option<JoinHandle<()>>>>,
}

impl PlaybackEngine {
    /// Create a new engine
    ///
    /// `output` is the process-wide audio output; `output_events` must be the
    /// receiving end of the channel that output reports into.
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        output: Box<dyn AudioOutput>,
        output_events: mpsc::UnboundedReceiver<OutputEvent>,
        state: Arc<SharedState>,
        settings: EngineSettings,
    ) -> Self {
        let mut transport = TransportSession::new(output);
        transport.set_volume(settings.initial_volume);

        let inner = EngineState {
            window: PlayWindow::new(),
            context: PlaybackContext::Single,
            pager: PlaylistPager::new(settings.page_size, settings.low_water_mark),
            transport,
            is_playing: false,
            position_ms: 0,
            duration_ms: 0,
            volume: settings.initial_volume,
            generation: 0,
            intent_epoch: 0,
            reset_epoch: 0,
        };
        state.publish_snapshot(inner.snapshot());

        info!(
            "Playback engine created (page_size={}, low_water_mark={}, volume={})",
            settings.page_size, settings.low_water_mark, settings.initial_volume
        );

        Self {
            gateway,
            inner: Arc::new(Mutex::new(inner)),
            state,
            settings,
            output_events_rx: Arc::new(Mutex::new(Some(output_events))),
            refill_task: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    /// Clone the shared handles for a spawned task
    pub(super) fn clone_handles(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            inner: Arc::clone(&self.inner),
            state: Arc::clone(&self.state),
            settings: self.settings,
            output_events_rx: Arc::clone(&self.output_events_rx),
            refill_task: Arc::clone(&self.refill_task),
        }
    }

    /// Start the audio output event loop
    ///
    /// Fails if the loop was already started.
    pub async fn start(&self) -> Result<()> {
        let rx = self.output_events_rx.lock().await.take();
        let Some(mut rx) = rx else {
            return Err(Error::InvalidState("Playback engine already started".to_string()));
        };

        info!("Starting playback engine");
        let self_clone = self.clone_handles();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                self_clone.handle_output_event(event).await;
            }
            debug!("Audio output event channel closed");
        });
        Ok(())
    }

    /// Apply one notification from the audio output
    ///
    /// Notifications about content that is no longer loaded are dropped; a
    /// late end-of-resource from the previous track never advances twice.
    pub async fn handle_output_event(&self, event: OutputEvent) {
        let mut s = self.inner.lock().await;
        if !s.transport.is_current_load(event.load_id()) {
            debug!("Ignoring stale output event: {:?}", event);
            return;
        }

        match event {
            OutputEvent::PositionChanged { position_ms, .. } => {
                s.position_ms = position_ms;
                if let Some(current) = s.window.current() {
                    self.state.broadcast_event(RiffleEvent::PlaybackProgress {
                        track_id: current.track_id().clone(),
                        position_ms,
                        duration_ms: s.duration_ms,
                        timestamp: chrono::Utc::now(),
                    });
                }
                self.state.publish_snapshot(s.snapshot());
            }
            OutputEvent::DurationChanged { duration_ms, .. } => {
                debug!("Output reported duration {}ms", duration_ms);
                s.duration_ms = duration_ms;
                self.state.publish_snapshot(s.snapshot());
            }
            OutputEvent::Ended { load_id } => {
                info!("End of resource (load {})", load_id);
                let old_state = s.playback_state();
                if let Err(e) = self.advance_locked(&mut s, true).await {
                    error!("Failed to advance after end of resource: {}", e);
                }
                self.finish(&s, old_state);
            }
        }
    }

    /// Current state as seen by presentation clients
    pub async fn snapshot(&self) -> PlayerSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Start a fetching command: supersedes every older in-flight fetch
    pub(super) async fn begin_request(&self) -> RequestTicket {
        let mut s = self.inner.lock().await;
        s.generation += 1;
        RequestTicket {
            generation: s.generation,
            intent_epoch: s.intent_epoch,
        }
    }

    /// Fail with `StaleResult` if a newer command superseded `ticket`
    pub(super) fn check_ticket(s: &EngineState, ticket: RequestTicket) -> Result<()> {
        if s.generation != ticket.generation {
            return Err(Error::StaleResult {
                issued: ticket.generation,
                current: s.generation,
            });
        }
        Ok(())
    }

    /// Whether a fetching play command should start playback on completion
    ///
    /// Plays unless a pause/resume arrived while the fetch was in flight, in
    /// which case the latest explicit intent wins.
    pub(super) fn autoplay_for(s: &EngineState, ticket: RequestTicket) -> bool {
        if s.intent_epoch == ticket.intent_epoch {
            true
        } else {
            s.is_playing
        }
    }

    /// Load the new current item and commit `next` as the window
    ///
    /// On load failure nothing changes. On success the old current (if any)
    /// is reported completed and the new one started.
    pub(super) async fn commit_window(
        &self,
        s: &mut EngineState,
        next: PlayWindow,
        trigger: QueueChangeTrigger,
        completed: bool,
    ) -> Result<()> {
        let Some(item) = next.current().cloned() else {
            return Err(Error::InvalidState("Window has no current item".to_string()));
        };

        s.transport.load_manifest(&item.track().manifest_url).await?;

        if let Some(old) = s.window.current() {
            self.state.broadcast_event(RiffleEvent::TrackCompleted {
                entry_id: old.entry_id(),
                track_id: old.track_id().clone(),
                position_ms: s.position_ms,
                completed,
                timestamp: chrono::Utc::now(),
            });
        }

        s.window = next;
        s.generation += 1;
        s.position_ms = 0;
        s.duration_ms = s.transport.duration_ms().unwrap_or(0);

        info!(
            "Now current: {} - {} ({:?})",
            item.track().artist.name,
            item.track().title,
            trigger
        );
        self.state.broadcast_event(RiffleEvent::TrackStarted {
            entry_id: item.entry_id(),
            track_id: item.track_id().clone(),
            playlist_id: item.playlist_id().cloned(),
            timestamp: chrono::Utc::now(),
        });
        self.emit_queue_changed(s, trigger);
        Ok(())
    }

    /// Put the output into the requested play state after a commit
    pub(super) fn start_output(&self, s: &mut EngineState, autoplay: bool) -> Result<()> {
        if !autoplay {
            s.transport.pause();
            s.is_playing = false;
            return Ok(());
        }
        match s.transport.play() {
            Ok(()) => {
                s.is_playing = true;
                Ok(())
            }
            Err(e) => {
                warn!("Audio output refused to play: {}", e);
                s.is_playing = false;
                Err(e)
            }
        }
    }

    /// Forward step shared by `advance()` and end-of-resource
    ///
    /// `completed` marks an end-of-resource step; if the next item then fails
    /// to load, the engine is left paused on the finished track. Pagination is
    /// only checked after stepping into the playlist queue.
    pub(super) async fn advance_locked(&self, s: &mut EngineState, completed: bool) -> Result<()> {
        let mut next = s.window.clone();
        match next.advance() {
            Advance::Exhausted => {
                info!("Forward queues empty, pausing on last track");
                s.transport.pause();
                s.is_playing = false;
                Ok(())
            }
            Advance::Moved { origin } => {
                debug!("Advancing from {:?} queue", origin);
                if let Err(e) = self
                    .commit_window(s, next, QueueChangeTrigger::Advance, completed)
                    .await
                {
                    if completed {
                        // The output stopped at the end of the old track
                        s.transport.pause();
                        s.is_playing = false;
                    }
                    return Err(e);
                }
                let played = self.start_output(s, true);
                if origin == Origin::Playlist {
                    self.maybe_refill(s);
                }
                played
            }
        }
    }

    pub(super) fn emit_queue_changed(&self, s: &EngineState, trigger: QueueChangeTrigger) {
        self.state.broadcast_event(RiffleEvent::QueueChanged {
            priority: s.window.priority().iter().map(|i| i.track_id().clone()).collect(),
            playlist: s.window.playlist().iter().map(|i| i.track_id().clone()).collect(),
            trigger,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Broadcast a state change (if any) and publish the new snapshot
    pub(super) fn finish(&self, s: &EngineState, old_state: PlaybackState) {
        let new_state = s.playback_state();
        if new_state != old_state {
            info!("Playback state changed: {} -> {}", old_state, new_state);
            self.state.broadcast_event(RiffleEvent::PlaybackStateChanged {
                old_state,
                new_state,
                timestamp: chrono::Utc::now(),
            });
        }
        self.state.publish_snapshot(s.snapshot());
    }
}

/// Swallow `StaleResult` so superseded commands return `Ok`
pub(super) fn discard_stale(result: Result<()>) -> Result<()> {
    match result {
        Err(Error::StaleResult { issued, current }) => {
            debug!(
                "Discarding superseded fetch result (generation {}, now {})",
                issued, current
            );
            Ok(())
        }
        other => other,
    }
}
