//! Error types for the relay.
//!
//! Only start-up and source failures surface here. Publishing has no error
//! path, and a subscriber's write failure ends that session alone.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to open source device {}: {source}", path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read from source device: {0}")]
    SourceRead(#[source] io::Error),

    #[error("source device closed")]
    SourceClosed,
}
