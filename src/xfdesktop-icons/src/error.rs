//! Error type for the fallible edges of the library
//!
//! Layout, selection, and input handling never fail; only I/O, decoding,
//! and configuration do.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IconViewError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize positions: {0}")]
    Positions(#[from] toml::ser::Error),

    #[error("failed to decode icon {name}: {reason}")]
    IconDecode { name: String, reason: String },

    #[error("failed to load font: {0}")]
    Font(String),

    #[error("malformed drag payload: {0}")]
    Payload(String),

    #[error("drag payload is empty")]
    EmptyPayload,
}

pub type Result<T> = std::result::Result<T, IconViewError>;
