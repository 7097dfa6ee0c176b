//! Cruft backed by packages in the package cache.

use crate::app::PackageRef;
use crate::cruft::Cruft;
use crate::error::CruftResult;

/// An installed package that can be removed.
///
/// A thin wrapper around the cache's package handle, which performs the
/// actual marking.
#[derive(Debug, Clone)]
pub struct PackageCruft {
    package: PackageRef,
    description: String,
}

impl PackageCruft {
    /// Create package cruft with the reason it is considered cruft.
    pub fn new(package: PackageRef, description: impl Into<String>) -> Self {
        Self {
            package,
            description: description.into(),
        }
    }

    /// The wrapped package.
    pub fn package(&self) -> &PackageRef {
        &self.package
    }
}

impl Cruft for PackageCruft {
    fn prefix(&self) -> &str {
        "deb"
    }

    fn prefix_description(&self) -> Option<String> {
        Some(".deb package".to_string())
    }

    fn shortname(&self) -> String {
        self.package.name().to_string()
    }

    fn description(&self) -> String {
        format!("{}\n\n{}", self.description, self.package.summary())
    }

    fn disk_usage(&self) -> Option<u64> {
        Some(self.package.installed_size())
    }

    fn cleanup(&mut self) -> CruftResult<()> {
        tracing::info!(package = self.package.name(), "marking package for removal");
        self.package.mark_delete()?;
        Ok(())
    }
}

/// A package that should be installed but is not.
#[derive(Debug, Clone)]
pub struct MissingPackageCruft {
    package: PackageRef,
    description: Option<String>,
}

impl MissingPackageCruft {
    /// Create missing-package cruft with the default description.
    pub fn new(package: PackageRef) -> Self {
        Self {
            package,
            description: None,
        }
    }

    /// Create missing-package cruft with an explicit description.
    pub fn with_description(package: PackageRef, description: impl Into<String>) -> Self {
        Self {
            package,
            description: Some(description.into()),
        }
    }
}

impl Cruft for MissingPackageCruft {
    fn prefix(&self) -> &str {
        "install-deb"
    }

    fn prefix_description(&self) -> Option<String> {
        Some("Install missing package.".to_string())
    }

    fn shortname(&self) -> String {
        self.package.name().to_string()
    }

    fn description(&self) -> String {
        match &self.description {
            Some(description) if !description.is_empty() => description.clone(),
            _ => format!("Package {} should be installed.", self.package.name()),
        }
    }

    fn cleanup(&mut self) -> CruftResult<()> {
        tracing::info!(package = self.package.name(), "marking package for installation");
        self.package.mark_install()?;
        Ok(())
    }
}
