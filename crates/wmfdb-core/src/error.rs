//! Error types shared by every wmfdb crate.

use std::path::PathBuf;
use thiserror::Error;

/// Parent error type for all wmfdb operations.
#[derive(Debug, Error)]
pub enum WmfdbError {
    /// An input or configuration value is invalid.
    #[error("{0}")]
    Value(String),

    /// A file could not be opened or read.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A database operation failed.
    #[error("{addr}: {message}")]
    Db { addr: String, message: String },
}

impl WmfdbError {
    /// Shorthand for a [`WmfdbError::Value`].
    pub fn value(msg: impl Into<String>) -> Self {
        Self::Value(msg.into())
    }

    /// Wrap an IO error together with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Shorthand for a [`WmfdbError::Db`] against the instance at `addr`.
    pub fn db(addr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Db {
            addr: addr.into(),
            message: message.into(),
        }
    }
}

/// Result alias used across wmfdb.
pub type Result<T> = std::result::Result<T, WmfdbError>;
