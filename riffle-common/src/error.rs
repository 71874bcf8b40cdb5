//! Common error types for riffle

use thiserror::Error;

/// Common result type for riffle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while locating or reading shared configuration files
#[derive(Error, Debug)]
pub enum Error {
    /// File missing or unreadable
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML document could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
