//! Error types for the recommender library.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The raw corpus is not a JSON array of records
    #[error("Invalid corpus JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot (de)serialization failed: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid taxonomy: {0}")]
    Taxonomy(String),

    /// The text index was built over a different corpus
    #[error("Index covers {index} documents but corpus has {corpus}")]
    IndexMismatch { index: usize, corpus: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A rebuild running off the request path panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
