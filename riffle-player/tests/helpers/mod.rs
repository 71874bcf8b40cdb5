//! Test helpers for riffle-player integration tests
//!
//! - `FakeOutput`: audio output that records every call instead of playing
//! - `RecordingGateway`: catalog gateway that records requests and can hold
//!   or fail selected fetches
//! - `TestEngine`: an engine wired to both

#![allow(dead_code)]

pub mod fake_output;
pub mod gateway;

pub use fake_output::{FakeOutput, OutputProbe};
pub use gateway::{PageRequest, RecordingGateway};

use riffle_common::{Artist, ArtistId, PlaylistId, Track, TrackId};
use riffle_player::config::EngineSettings;
use riffle_player::gateway::CatalogGateway;
use riffle_player::{PlaybackEngine, SharedState};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Engine plus handles for inspecting its collaborators
pub struct TestEngine {
    pub engine: Arc<PlaybackEngine>,
    pub gateway: Arc<RecordingGateway>,
    pub output: OutputProbe,
    pub state: Arc<SharedState>,
}

impl TestEngine {
    pub fn new(gateway: RecordingGateway) -> Self {
        Self::with_settings(gateway, EngineSettings::default())
    }

    pub fn with_settings(gateway: RecordingGateway, settings: EngineSettings) -> Self {
        let gateway = Arc::new(gateway);
        let (output, probe) = FakeOutput::new();
        // Tests feed output notifications through handle_output_event directly
        let (_tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(SharedState::new());
        let engine = Arc::new(PlaybackEngine::new(
            gateway.clone(),
            Box::new(output),
            rx,
            Arc::clone(&state),
            settings,
        ));
        Self {
            engine,
            gateway,
            output: probe,
            state,
        }
    }

    /// Track ids of the playlist queue, head first
    pub async fn playlist_queue(&self) -> Vec<String> {
        let snapshot = self.engine.snapshot().await;
        snapshot
            .playlist_queue
            .iter()
            .map(|i| i.track.id.to_string())
            .collect()
    }

    pub async fn priority_queue(&self) -> Vec<String> {
        let snapshot = self.engine.snapshot().await;
        snapshot
            .priority_queue
            .iter()
            .map(|i| i.track.id.to_string())
            .collect()
    }

    pub async fn previous(&self) -> Vec<String> {
        let snapshot = self.engine.snapshot().await;
        snapshot
            .previous
            .iter()
            .map(|i| i.track.id.to_string())
            .collect()
    }

    pub async fn current(&self) -> Option<String> {
        let snapshot = self.engine.snapshot().await;
        snapshot.current.map(|i| i.track.id.to_string())
    }
}

pub fn manifest_url(track_id: &str) -> String {
    format!("https://cdn.test/{}/index.m3u8", track_id)
}

pub fn track(id: &str) -> Track {
    Track {
        id: TrackId::from(id),
        title: format!("Track {}", id),
        artist: Artist {
            id: ArtistId::from("artist-1"),
            name: "Test Artist".to_string(),
            image_url: None,
            description: None,
        },
        duration_ms: 180_000,
        cover_url: format!("https://cdn.test/{}/cover.jpg", id),
        manifest_url: manifest_url(id),
        lyrics: None,
    }
}

/// Catalog with single tracks `a`..`e`, `x`, `y` and a playlist `p` of
/// `playlist_len` tracks named `p-0`, `p-1`, ...
pub fn catalog(playlist_len: u32) -> CatalogGateway {
    let mut catalog = CatalogGateway::new();
    for id in ["a", "b", "c", "d", "e", "x", "y"] {
        catalog.insert_track(track(id));
    }
    add_playlist(&mut catalog, "p", playlist_len);
    catalog
}

pub fn add_playlist(catalog: &mut CatalogGateway, playlist_id: &str, len: u32) {
    let ids: Vec<TrackId> = (0..len)
        .map(|i| {
            let id = format!("{}-{}", playlist_id, i);
            catalog.insert_track(track(&id));
            TrackId::from(id)
        })
        .collect();
    catalog.insert_playlist(PlaylistId::from(playlist_id), ids);
}

/// Yield until the gateway has seen `count` track lookups
pub async fn wait_for_track_requests(gateway: &Arc<RecordingGateway>, count: usize) {
    while gateway.track_requests().len() < count {
        tokio::task::yield_now().await;
    }
}
