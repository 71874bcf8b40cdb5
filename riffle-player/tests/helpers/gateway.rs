//! Recording data gateway

use async_trait::async_trait;
use riffle_common::{PlaylistEntry, PlaylistId, Track, TrackId};
use riffle_player::gateway::{CatalogGateway, DataGateway};
use riffle_player::{Error, Result};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub playlist_id: String,
    pub offset: u32,
    pub limit: u32,
}

/// Catalog gateway that records every request
///
/// Gated fetches wait for a permit on their semaphore before answering, so a
/// test can hold a fetch in flight while it issues other commands.
pub struct RecordingGateway {
    catalog: CatalogGateway,
    page_requests: Mutex<Vec<PageRequest>>,
    track_requests: Mutex<Vec<String>>,
    track_gate: Option<Arc<Semaphore>>,
    /// Pages at or past this offset wait on `page_gate`
    page_gate: Option<(u32, Arc<Semaphore>)>,
    /// Pages at or past this offset fail
    failing_pages_from: Option<u32>,
}

impl RecordingGateway {
    pub fn new(catalog: CatalogGateway) -> Self {
        Self {
            catalog,
            page_requests: Mutex::new(Vec::new()),
            track_requests: Mutex::new(Vec::new()),
            track_gate: None,
            page_gate: None,
            failing_pages_from: None,
        }
    }

    /// Hold every track lookup until a permit is added to the returned gate
    pub fn gate_tracks(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.track_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    /// Hold page fetches with `offset >= from` until a permit is added
    pub fn gate_pages_from(mut self, from: u32) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.page_gate = Some((from, Arc::clone(&gate)));
        (self, gate)
    }

    pub fn fail_pages_from(mut self, from: u32) -> Self {
        self.failing_pages_from = Some(from);
        self
    }

    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.page_requests.lock().unwrap().clone()
    }

    pub fn track_requests(&self) -> Vec<String> {
        self.track_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataGateway for RecordingGateway {
    async fn get_track(&self, track_id: &TrackId) -> Result<Option<Track>> {
        self.track_requests
            .lock()
            .unwrap()
            .push(track_id.to_string());
        if let Some(gate) = &self.track_gate {
            gate.acquire().await.unwrap().forget();
        }
        self.catalog.get_track(track_id).await
    }

    async fn get_playlist_page(
        &self,
        playlist_id: &PlaylistId,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<PlaylistEntry>> {
        self.page_requests.lock().unwrap().push(PageRequest {
            playlist_id: playlist_id.to_string(),
            offset,
            limit,
        });
        if let Some((from, gate)) = &self.page_gate {
            if offset >= *from {
                gate.acquire().await.unwrap().forget();
            }
        }
        if let Some(from) = self.failing_pages_from {
            if offset >= from {
                return Err(Error::Gateway("record store unavailable".to_string()));
            }
        }
        self.catalog.get_playlist_page(playlist_id, offset, limit).await
    }
}
