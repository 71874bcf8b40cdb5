//! Track/playlist data gateway
//!
//! The engine's only view of the record store. Two implementations ship:
//! - `HttpGateway`: JSON over HTTP against the record store service
//! - `CatalogGateway`: in-memory catalog loaded from a TOML file

mod catalog;
mod http;

pub use catalog::{CatalogGateway, CatalogFile};
pub use http::HttpGateway;

use crate::error::Result;
use async_trait::async_trait;
use riffle_common::{PlaylistEntry, PlaylistId, Track, TrackId};

/// Data gateway contract consumed by the playback engine
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Resolve a track id to full metadata
    ///
    /// # Returns
    /// * `Ok(Some(track))` - Track exists
    /// * `Ok(None)` - No such track
    /// * `Err(Error::Gateway)` - Record store unreachable or response malformed
    async fn get_track(&self, track_id: &TrackId) -> Result<Option<Track>>;

    /// Fetch up to `limit` entries whose order is `offset..offset + limit`
    ///
    /// Entries come back sorted by order. An offset past the end yields an
    /// empty vector; an unknown playlist yields `Err(Error::NotFound)`.
    async fn get_playlist_page(
        &self,
        playlist_id: &PlaylistId,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<PlaylistEntry>>;
}
