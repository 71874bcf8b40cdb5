//! In-memory catalog gateway
//!
//! Serves tracks and playlists from a TOML catalog file. Used for offline
//! runs of the player service and as the data source in tests.
//!
//! ```toml
//! [[artists]]
//! id = "a1"
//! name = "The Band"
//!
//! [[tracks]]
//! id = "t1"
//! title = "Opening"
//! artist = "a1"
//! duration_ms = 215000
//! manifest_url = "https://cdn.example/t1/index.m3u8"
//!
//! [[playlists]]
//! id = "p1"
//! name = "Road trip"
//! tracks = ["t1"]
//! ```

use super::DataGateway;
use crate::error::{Error, Result};
use async_trait::async_trait;
use riffle_common::{Artist, ArtistId, PlaylistEntry, PlaylistId, Track, TrackId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// On-disk catalog layout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub artists: Vec<CatalogArtist>,
    #[serde(default)]
    pub tracks: Vec<CatalogTrack>,
    #[serde(default)]
    pub playlists: Vec<CatalogPlaylist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogTrack {
    pub id: String,
    pub title: String,
    /// Artist id, must appear in `artists`
    pub artist: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub cover_url: String,
    pub manifest_url: String,
    #[serde(default)]
    pub lyrics: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPlaylist {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Track ids in play order
    #[serde(default)]
    pub tracks: Vec<String>,
}

/// Gateway backed by an in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct CatalogGateway {
    tracks: HashMap<TrackId, Track>,
    playlists: HashMap<PlaylistId, Vec<TrackId>>,
}

impl CatalogGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let file: CatalogFile = riffle_common::config::load_toml(path)?;
        let gateway = Self::from_catalog(file)?;
        info!(
            "Catalog loaded from {}: {} tracks, {} playlists",
            path.display(),
            gateway.tracks.len(),
            gateway.playlists.len()
        );
        Ok(gateway)
    }

    /// Build from a parsed catalog, resolving artist and track references
    pub fn from_catalog(file: CatalogFile) -> Result<Self> {
        let artists: HashMap<String, Artist> = file
            .artists
            .into_iter()
            .map(|a| {
                let artist = Artist {
                    id: ArtistId::new(a.id.clone()),
                    name: a.name,
                    image_url: a.image_url,
                    description: a.description,
                };
                (a.id, artist)
            })
            .collect();

        let mut gateway = Self::new();
        for t in file.tracks {
            let artist = artists.get(&t.artist).cloned().ok_or_else(|| {
                Error::Config(format!("Track {} references unknown artist {}", t.id, t.artist))
            })?;
            gateway.insert_track(Track {
                id: TrackId::new(t.id),
                title: t.title,
                artist,
                duration_ms: t.duration_ms,
                cover_url: t.cover_url,
                manifest_url: t.manifest_url,
                lyrics: t.lyrics,
            });
        }

        for p in file.playlists {
            let track_ids: Vec<TrackId> = p.tracks.into_iter().map(TrackId::new).collect();
            if let Some(missing) = track_ids.iter().find(|id| !gateway.tracks.contains_key(*id)) {
                return Err(Error::Config(format!(
                    "Playlist {} references unknown track {}",
                    p.id, missing
                )));
            }
            gateway.insert_playlist(PlaylistId::new(p.id), track_ids);
        }

        Ok(gateway)
    }

    pub fn insert_track(&mut self, track: Track) {
        self.tracks.insert(track.id.clone(), track);
    }

    pub fn insert_playlist(&mut self, playlist_id: PlaylistId, track_ids: Vec<TrackId>) {
        self.playlists.insert(playlist_id, track_ids);
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

#[async_trait]
impl DataGateway for CatalogGateway {
    async fn get_track(&self, track_id: &TrackId) -> Result<Option<Track>> {
        Ok(self.tracks.get(track_id).cloned())
    }

    async fn get_playlist_page(
        &self,
        playlist_id: &PlaylistId,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<PlaylistEntry>> {
        let track_ids = self
            .playlists
            .get(playlist_id)
            .ok_or_else(|| Error::NotFound(format!("playlist {}", playlist_id)))?;

        Ok(track_ids
            .iter()
            .enumerate()
            .skip(offset as usize)
            .take(limit as usize)
            .filter_map(|(order, id)| {
                self.tracks.get(id).map(|track| PlaylistEntry {
                    playlist_id: playlist_id.clone(),
                    order: order as u32,
                    track: track.clone(),
                })
            })
            .collect())
    }
}
