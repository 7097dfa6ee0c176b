//! Error types for cruft cleanup and package cache access.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for cruft operations.
pub type CruftResult<T> = Result<T, CruftError>;

/// Errors raised by the package cache collaborator.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Applying pending package changes failed.
    #[error("Commit failed: {message}")]
    Commit { message: String },

    /// I/O error while reading cache state.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    /// Create an I/O error for a cache file.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors that can occur while constructing or cleaning up cruft.
#[derive(Debug, Error)]
pub enum CruftError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The package cache refused a change.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// An external command could not be run.
    #[error("Failed to run '{command}': {source}")]
    Command {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl CruftError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}
