//! Error types for riffle-player
//!
//! Defines the engine's error taxonomy using thiserror. `NotFound`, `Empty`
//! and `Transport` reach command callers; `StaleResult` is internal and is
//! swallowed by the engine before a command returns.

use thiserror::Error;

/// Main error type for riffle-player
#[derive(Error, Debug)]
pub enum Error {
    /// Track, playlist or queue entry id does not resolve
    #[error("Not found: {0}")]
    NotFound(String),

    /// Playlist page empty at the requested offset
    #[error("Empty playlist page: {0}")]
    Empty(String),

    /// Manifest failed to load or the output refused to play it
    #[error("Transport error: {0}")]
    Transport(String),

    /// A fetch resolved after a newer command superseded it
    #[error("Stale result discarded (generation {issued}, now {current})")]
    StaleResult { issued: u64, current: u64 },

    /// Data gateway unreachable or returned a malformed response
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<riffle_common::Error> for Error {
    fn from(err: riffle_common::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Gateway(err.to_string())
    }
}

/// Convenience Result type using riffle-player Error
pub type Result<T> = std::result::Result<T, Error>;
