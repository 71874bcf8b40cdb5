//! Record store client over HTTP
//!
//! Endpoints:
//! - `GET {base}/tracks/{id}` returns a track JSON object, 404 when unknown
//! - `GET {base}/playlists/{id}/entries?offset=&limit=` returns an array of
//!   playlist entries, 404 when the playlist is unknown

use super::DataGateway;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use riffle_common::{PlaylistEntry, PlaylistId, Track, TrackId};
use std::time::Duration;
use tracing::debug;

pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Cannot build HTTP client: {}", e)))?;

        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| Error::Config(format!("Invalid record store URL {}: {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("Record store URL {} cannot take a path", raw)));
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Base URL extended by `segments`, each percent-encoded as one path segment
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl DataGateway for HttpGateway {
    async fn get_track(&self, track_id: &TrackId) -> Result<Option<Track>> {
        let url = self.endpoint(&["tracks", track_id.as_str()]);
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let track = response.error_for_status()?.json::<Track>().await?;
        Ok(Some(track))
    }

    async fn get_playlist_page(
        &self,
        playlist_id: &PlaylistId,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<PlaylistEntry>> {
        let url = self.endpoint(&["playlists", playlist_id.as_str(), "entries"]);
        debug!("GET {} offset={} limit={}", url, offset, limit);

        let response = self
            .client
            .get(url)
            .query(&[("offset", offset), ("limit", limit)])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("playlist {}", playlist_id)));
        }

        let mut entries = response
            .error_for_status()?
            .json::<Vec<PlaylistEntry>>()
            .await?;
        entries.sort_by_key(|e| e.order);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let gateway = HttpGateway::new("http://localhost:3000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn test_ids_are_encoded_as_single_segments() {
        let gateway = HttpGateway::new("http://localhost:3000/api/", Duration::from_secs(1)).unwrap();
        let url = gateway.endpoint(&["tracks", "a/b?c#d"]);
        assert_eq!(url.as_str(), "http://localhost:3000/api/tracks/a%2Fb%3Fc%23d");

        let bare = HttpGateway::new("http://localhost:3000", Duration::from_secs(1)).unwrap();
        let url = bare.endpoint(&["playlists", "p 1", "entries"]);
        assert_eq!(url.as_str(), "http://localhost:3000/playlists/p%201/entries");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = HttpGateway::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_gateway_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let gateway = HttpGateway::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let result = gateway.get_track(&TrackId::from("t1")).await;
        assert!(matches!(result, Err(Error::Gateway(_))));
    }
}
