//! Error types for snapshot persistence.

use std::io;
use std::path::PathBuf;

use layered_expect::ExpectError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    /// The snapshot document is not valid RON.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to serialize snapshots: {0}")]
    Serialize(String),

    #[error("unsupported snapshot version {found} in {path} (expected {expected})")]
    Version { path: PathBuf, found: u32, expected: u32 },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for ExpectError {
    fn from(error: StoreError) -> Self {
        ExpectError::Store(error.to_string())
    }
}
