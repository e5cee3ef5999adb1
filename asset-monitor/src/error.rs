//! Error taxonomy.
//!
//! Configuration errors are fatal at startup. Everything raised during a
//! cycle is a [`CycleError`] and is contained by the evaluation loop.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Crate-level error for startup and the API server.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for `{key}`: {reason}")]
    InvalidField { key: String, reason: String },
}

/// A caller passed an argument outside the operation's domain.
#[derive(Debug, Error, PartialEq)]
#[error("invalid argument: {0}")]
pub struct InvalidArgument(pub String);

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("reading source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("alert sink I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode alert record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Recoverable failures of a single evaluation cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}

impl CycleError {
    /// Short machine-readable name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::Source(_) => "source",
            CycleError::Sink(_) => "sink",
            CycleError::InvalidArgument(_) => "invalid_argument",
        }
    }
}
