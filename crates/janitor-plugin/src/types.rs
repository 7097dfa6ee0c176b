//! Core types for the plugin system.

use std::path::PathBuf;

use janitor_core::{CacheError, CruftError};
use thiserror::Error;

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors that can occur in the plugin system.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A plugin source file could not be read or parsed.
    #[error("Failed to load plugin source {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// A plugin source names a kind the registry does not know.
    #[error("Plugin source {path} names unknown plugin kind '{kind}'")]
    UnknownKind { path: PathBuf, kind: String },

    /// A kind was registered twice.
    #[error("Plugin kind '{kind}' is already registered")]
    DuplicateKind { kind: String },

    /// The plugin was used before the manager attached the application.
    #[error("Plugin '{name}' has no application attached")]
    NoApplication { name: String },

    /// Plugin execution error.
    #[error("Plugin '{name}' execution error: {message}")]
    Execution { name: String, message: String },

    /// A file the plugin reads could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating cruft failed.
    #[error(transparent)]
    Cruft(#[from] CruftError),

    /// The package cache reported an error.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl PluginError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
