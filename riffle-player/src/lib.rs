//! # Riffle Player Library (riffle-player)
//!
//! Playback engine for a streaming music client.
//!
//! **Purpose:** Decide what plays next, keep a bounded lookahead over paginated
//! playlists, and keep the single audio output consistent across seeks,
//! skips, queue insertions and end-of-track notifications.
//!
//! **Architecture:** One `PlaybackEngine` owns the play window, both forward
//! queues, the playlist pager and the adaptive transport session. Track and
//! playlist data come from a `DataGateway`; audio comes out of an `AudioOutput`.
//! Both are injected at construction.

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod gateway;
pub mod playback;
pub mod state;

pub use error::{Error, Result};
pub use playback::PlaybackEngine;
pub use state::SharedState;
