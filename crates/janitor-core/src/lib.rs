//! Core types and traits for janitor.
//!
//! This crate provides the cruft abstraction (one removable or fixable
//! artifact), the concrete cruft kinds shared by many detectors, and the
//! interfaces of the external application that owns the package cache.

mod app;
mod cruft;
mod error;
mod file;
mod package;
mod progress;

#[cfg(feature = "testing")]
pub mod testing;

pub use app::{Application, Notification, Package, PackageCache, PackageRef};
pub use cruft::{Cruft, CruftExt};
pub use error::{CacheError, CruftError, CruftResult};
pub use file::FileCruft;
pub use package::{MissingPackageCruft, PackageCruft};
pub use progress::{FetchProgress, InstallProgress, LogProgress};
