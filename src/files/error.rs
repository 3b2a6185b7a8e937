//! Log input and artifact output errors.

use std::path::PathBuf;

use super::filename::FilenameError;

/// Errors that can occur while reading a raw job log.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Log file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read log {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Log {path} is not valid UTF-8 (invalid byte at offset {offset})")]
    Undecodable { path: PathBuf, offset: usize },
}

/// Errors that can occur while persisting segmentation artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Filename(#[from] FilenameError),
}
