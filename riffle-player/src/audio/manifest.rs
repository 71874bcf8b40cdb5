//! HLS manifest probing
//!
//! Adapter around the `hls_m3u8` crate. The clock output only needs the
//! authoritative length of a resource, which for HLS is the sum of the
//! media playlist's segment durations. Master playlists are followed to
//! their first variant.

use crate::error::{Error, Result};
use hls_m3u8::tags::VariantStream;
use hls_m3u8::{MasterPlaylist, MediaPlaylist};
use std::time::Duration;
use tracing::debug;

/// What a manifest document turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestKind {
    /// Media playlist with its total segment duration
    Media(Duration),
    /// Master playlist; carries the (possibly relative) URI of the first variant
    Master(String),
}

/// Classify a manifest document
pub fn parse_manifest(text: &str) -> Result<ManifestKind> {
    if let Ok(media) = MediaPlaylist::try_from(text) {
        return Ok(ManifestKind::Media(media.duration()));
    }

    let master = MasterPlaylist::try_from(text)
        .map_err(|e| Error::Transport(format!("Unparseable manifest: {}", e)))?;

    let uri = master
        .variant_streams
        .iter()
        .find_map(|vs| match vs {
            VariantStream::ExtXStreamInf { uri, .. } => Some(uri.to_string()),
            VariantStream::ExtXIFrame { .. } => None,
        })
        .ok_or_else(|| Error::Transport("Master playlist has no variant streams".to_string()))?;

    Ok(ManifestKind::Master(uri))
}

/// Fetch a manifest and compute the resource length
pub async fn probe_duration(client: &reqwest::Client, manifest_url: &str) -> Result<Duration> {
    let text = fetch_text(client, manifest_url).await?;

    match parse_manifest(&text)? {
        ManifestKind::Media(duration) => Ok(duration),
        ManifestKind::Master(variant_uri) => {
            let base = reqwest::Url::parse(manifest_url)
                .map_err(|e| Error::Transport(format!("Bad manifest URL {}: {}", manifest_url, e)))?;
            let variant_url = base
                .join(&variant_uri)
                .map_err(|e| Error::Transport(format!("Bad variant URI {}: {}", variant_uri, e)))?;
            debug!("Following first variant {}", variant_url);

            let text = fetch_text(client, variant_url.as_str()).await?;
            match parse_manifest(&text)? {
                ManifestKind::Media(duration) => Ok(duration),
                ManifestKind::Master(_) => Err(Error::Transport(
                    "Variant URI points at another master playlist".to_string(),
                )),
            }
        }
    }
}

async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Transport(format!("Fetch {} failed: {}", url, e)))?
        .error_for_status()
        .map_err(|e| Error::Transport(format!("Fetch {} failed: {}", url, e)))?;

    response
        .text()
        .await
        .map_err(|e| Error::Transport(format!("Read {} failed: {}", url, e)))
}
