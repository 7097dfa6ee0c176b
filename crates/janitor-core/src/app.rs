//! Interfaces of the application that hosts the plugins.
//!
//! The application owns the package cache, applies pending package changes
//! and receives notifications. Every plugin reaches it through the same
//! shared handle; execution is sequential, so implementations only need
//! interior mutability, not a locking discipline of their own.

use std::fmt;
use std::sync::Arc;

use crate::error::CacheError;
use crate::progress::{FetchProgress, InstallProgress};

/// Shared handle to a package known to the cache.
pub type PackageRef = Arc<dyn Package>;

/// A package as seen through the package cache.
///
/// Mark methods take `&self`: the same handle is held by the cache and by
/// any cruft created for it.
pub trait Package: fmt::Debug + Send + Sync {
    /// Package name.
    fn name(&self) -> &str;

    /// One-line package summary.
    fn summary(&self) -> String;

    /// Installed size in bytes.
    fn installed_size(&self) -> u64;

    /// Whether the package is currently installed.
    fn is_installed(&self) -> bool;

    /// Whether the package was installed only to satisfy a dependency.
    fn is_auto_installed(&self) -> bool;

    /// Mark the package for installation.
    fn mark_install(&self) -> Result<(), CacheError>;

    /// Mark the package for removal.
    fn mark_delete(&self) -> Result<(), CacheError>;

    /// Keep the package in its current state.
    fn mark_keep(&self) -> Result<(), CacheError>;
}

/// The package cache.
pub trait PackageCache: Send + Sync {
    /// Look up a package by name.
    fn get(&self, name: &str) -> Option<PackageRef>;

    /// Whether a package with this name is known.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All known packages.
    fn packages(&self) -> Vec<PackageRef>;

    /// Apply all pending package changes.
    fn commit(
        &self,
        fetch: &mut dyn FetchProgress,
        install: &mut dyn InstallProgress,
    ) -> Result<(), CacheError>;
}

/// A message sent from a plugin or cruft to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Who sent it (plugin or cruft name).
    pub source: String,
    /// What happened.
    pub message: String,
}

impl Notification {
    /// Create a new notification.
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
        }
    }
}

/// The application environment shared by all plugins.
pub trait Application: Send + Sync {
    /// The package cache.
    fn cache(&self) -> &dyn PackageCache;

    /// Reload cache state, typically after a commit.
    fn refresh_cache(&self) -> Result<(), CacheError>;

    /// Deliver a notification.
    fn notify(&self, notification: Notification);
}
