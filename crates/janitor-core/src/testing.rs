//! In-memory collaborators for tests.
//!
//! Enabled with the `testing` feature. The doubles record every interaction
//! so tests can observe what plugins and cruft did to the application.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use strum::Display;

use crate::app::{Application, Notification, Package, PackageCache, PackageRef};
use crate::error::CacheError;
use crate::progress::{FetchProgress, InstallProgress};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A mark applied to a [`MockPackage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PackageMark {
    Install,
    Delete,
    Keep,
}

/// A package with fixed metadata that records marks.
#[derive(Debug)]
pub struct MockPackage {
    name: String,
    summary: String,
    installed_size: u64,
    installed: bool,
    auto_installed: bool,
    marks: Mutex<Vec<PackageMark>>,
}

impl MockPackage {
    /// A package named `name` with summary `summary` and size 12765.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: "summary".to_string(),
            installed_size: 12765,
            installed: false,
            auto_installed: false,
            marks: Mutex::new(Vec::new()),
        }
    }

    /// Set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Set the installed size.
    pub fn with_installed_size(mut self, size: u64) -> Self {
        self.installed_size = size;
        self
    }

    /// Mark as installed.
    pub fn installed(mut self) -> Self {
        self.installed = true;
        self
    }

    /// Mark as automatically installed.
    pub fn auto_installed(mut self) -> Self {
        self.auto_installed = true;
        self
    }

    /// Every mark applied so far, in order.
    pub fn marks(&self) -> Vec<PackageMark> {
        lock(&self.marks).clone()
    }

    /// Whether `mark_install` was called.
    pub fn install_marked(&self) -> bool {
        self.marks().contains(&PackageMark::Install)
    }

    /// Whether `mark_delete` was called.
    pub fn delete_marked(&self) -> bool {
        self.marks().contains(&PackageMark::Delete)
    }

    fn record(&self, mark: PackageMark) -> Result<(), CacheError> {
        lock(&self.marks).push(mark);
        Ok(())
    }
}

impl Package for MockPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn summary(&self) -> String {
        self.summary.clone()
    }

    fn installed_size(&self) -> u64 {
        self.installed_size
    }

    fn is_installed(&self) -> bool {
        self.installed
    }

    fn is_auto_installed(&self) -> bool {
        self.auto_installed
    }

    fn mark_install(&self) -> Result<(), CacheError> {
        self.record(PackageMark::Install)
    }

    fn mark_delete(&self) -> Result<(), CacheError> {
        self.record(PackageMark::Delete)
    }

    fn mark_keep(&self) -> Result<(), CacheError> {
        self.record(PackageMark::Keep)
    }
}

/// A package cache over a list of [`MockPackage`]s.
#[derive(Debug, Default)]
pub struct MockCache {
    packages: Mutex<Vec<Arc<MockPackage>>>,
    commits: AtomicUsize,
    fail_commit: AtomicBool,
}

impl MockCache {
    /// Add a package, returning the shared handle.
    pub fn add(&self, package: MockPackage) -> Arc<MockPackage> {
        let package = Arc::new(package);
        lock(&self.packages).push(Arc::clone(&package));
        package
    }

    /// Number of commits so far.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Make subsequent commits fail.
    pub fn set_fail_commit(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }
}

impl PackageCache for MockCache {
    fn get(&self, name: &str) -> Option<PackageRef> {
        lock(&self.packages)
            .iter()
            .find(|p| p.name == name)
            .map(|p| Arc::clone(p) as PackageRef)
    }

    fn packages(&self) -> Vec<PackageRef> {
        lock(&self.packages)
            .iter()
            .map(|p| Arc::clone(p) as PackageRef)
            .collect()
    }

    fn commit(
        &self,
        fetch: &mut dyn FetchProgress,
        install: &mut dyn InstallProgress,
    ) -> Result<(), CacheError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        fetch.start();
        fetch.stop();
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(CacheError::Commit {
                message: "commit refused".to_string(),
            });
        }
        install.start();
        install.finish();
        Ok(())
    }
}

/// An application that records commits, refreshes and notifications.
#[derive(Debug, Default)]
pub struct MockApplication {
    cache: MockCache,
    refreshes: AtomicUsize,
    notifications: Mutex<Vec<Notification>>,
}

impl MockApplication {
    /// Create an application with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The concrete cache, for adding packages and inspecting commits.
    pub fn mock_cache(&self) -> &MockCache {
        &self.cache
    }

    /// Whether the cache was committed at least once.
    pub fn commit_called(&self) -> bool {
        self.cache.commit_count() > 0
    }

    /// Whether the cache was refreshed at least once.
    pub fn refresh_called(&self) -> bool {
        self.refreshes.load(Ordering::SeqCst) > 0
    }

    /// Every notification received so far, in order.
    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }
}

impl Application for MockApplication {
    fn cache(&self) -> &dyn PackageCache {
        &self.cache
    }

    fn refresh_cache(&self) -> Result<(), CacheError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn notify(&self, notification: Notification) {
        lock(&self.notifications).push(notification);
    }
}
