//! Error types for alarm storage.

use std::path::PathBuf;
use thiserror::Error;

/// Ways the alarm record can fail to load or save.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The record (or its directory) could not be read.
    #[error("failed to read alarm record at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record could not be written, renamed or removed.
    #[error("failed to write alarm record at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored document is not a valid alarm.
    #[error("corrupt alarm record at {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// The alarm could not be encoded for storage.
    #[error("failed to encode alarm: {0}")]
    Encode(String),
}

impl StorageError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }
}

/// Convenience type alias for storage results.
pub type StorageResult<T> = Result<T, StorageError>;
