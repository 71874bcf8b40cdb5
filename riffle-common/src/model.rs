//! Catalog model types
//!
//! Values produced by the data gateway. The playback engine never mutates
//! them, it only holds references (usually `Arc<Track>`) while an item sits
//! in the play window.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Opaque track identifier issued by the record store
    TrackId
);
string_id!(
    /// Opaque playlist identifier issued by the record store
    PlaylistId
);
string_id!(
    /// Opaque artist identifier issued by the record store
    ArtistId
);

/// Artist information embedded in a resolved track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fully resolved track metadata
///
/// `duration_ms` is the length stored by the record store at upload time. The
/// engine reports the audio output's measured duration instead once it is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: Artist,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub cover_url: String,
    /// Adaptive-streaming manifest (HLS playlist URL)
    #[serde(alias = "audioUrl")]
    pub manifest_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
}

/// One row of a playlist as delivered by a page fetch
///
/// `order` is dense and zero-based within the playlist at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub playlist_id: PlaylistId,
    pub order: u32,
    pub track: Track,
}
