//! # Riffle Common Library
//!
//! Shared code for the riffle workspace:
//! - Catalog model types (tracks, artists, playlist entries)
//! - Event types broadcast to presentation clients (RiffleEvent enum)
//! - Configuration file resolution
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod model;

pub use error::{Error, Result};
pub use model::{Artist, ArtistId, PlaylistEntry, PlaylistId, Track, TrackId};
