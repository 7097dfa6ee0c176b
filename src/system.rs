//! Application backed by the dpkg status database.
//!
//! Package marks are held in memory. Committing reports the pending changes
//! through the progress reporters and clears them; installing or removing
//! packages is left to the package manager.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use indexmap::{IndexMap, IndexSet};
use janitor_core::{
    Application, CacheError, FetchProgress, InstallProgress, Notification, Package, PackageCache,
    PackageRef,
};
use janitor_plugins::{Stanza, parse_stanzas};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingMark {
    Install,
    Delete,
    Keep,
}

impl PendingMark {
    fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Delete => "remove",
            Self::Keep => "keep",
        }
    }
}

/// A package entry from the status database.
#[derive(Debug)]
pub struct StatusPackage {
    name: String,
    summary: String,
    installed_size: u64,
    installed: bool,
    auto_installed: bool,
    mark: Mutex<Option<PendingMark>>,
}

impl StatusPackage {
    fn from_stanza(stanza: &Stanza, auto_installed: bool) -> Option<Self> {
        let name = stanza.get("Package")?.to_string();
        let installed = stanza
            .get("Status")
            .and_then(|status| status.split_whitespace().nth(2))
            .is_some_and(|state| state == "installed");
        let summary = stanza
            .get("Description")
            .and_then(|d| d.lines().next())
            .unwrap_or_default()
            .to_string();
        // Installed-Size is recorded in KiB.
        let installed_size = stanza
            .get("Installed-Size")
            .and_then(|size| size.trim().parse::<u64>().ok())
            .map_or(0, |kib| {
                kib.checked_mul(1024).unwrap_or_else(|| {
                    tracing::debug!(package = %name, kib, "ignoring oversized Installed-Size");
                    0
                })
            });

        Some(Self {
            name,
            summary,
            installed_size,
            installed,
            auto_installed,
            mark: Mutex::new(None),
        })
    }

    fn set_mark(&self, mark: PendingMark) -> Result<(), CacheError> {
        *self.mark.lock().unwrap_or_else(PoisonError::into_inner) = Some(mark);
        Ok(())
    }

    fn take_mark(&self) -> Option<PendingMark> {
        self.mark.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl Package for StatusPackage {
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
        self.set_mark(PendingMark::Install)
    }

    fn mark_delete(&self) -> Result<(), CacheError> {
        self.set_mark(PendingMark::Delete)
    }

    fn mark_keep(&self) -> Result<(), CacheError> {
        self.set_mark(PendingMark::Keep)
    }
}

type PackageMap = IndexMap<String, Arc<StatusPackage>>;

/// Package cache read from the dpkg status file and apt's extended states.
#[derive(Debug)]
pub struct StatusCache {
    status_file: PathBuf,
    extended_states: PathBuf,
    packages: RwLock<PackageMap>,
}

impl StatusCache {
    /// Read both files. A missing extended states file means nothing is
    /// auto-installed.
    pub fn open(
        status_file: impl Into<PathBuf>,
        extended_states: impl Into<PathBuf>,
    ) -> Result<Self, CacheError> {
        let cache = Self {
            status_file: status_file.into(),
            extended_states: extended_states.into(),
            packages: RwLock::new(PackageMap::new()),
        };
        cache.reload()?;
        Ok(cache)
    }

    /// Re-read the files, dropping all pending marks.
    pub fn reload(&self) -> Result<(), CacheError> {
        let status = read(&self.status_file)?;
        let auto = match std::fs::read_to_string(&self.extended_states) {
            Ok(content) => auto_installed(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => IndexSet::new(),
            Err(err) => return Err(CacheError::io(&self.extended_states, err)),
        };

        let packages: PackageMap = parse_stanzas(&status)
            .iter()
            .filter_map(|stanza| {
                let name = stanza.get("Package")?;
                StatusPackage::from_stanza(stanza, auto.contains(name))
            })
            .map(|pkg| (pkg.name.clone(), Arc::new(pkg)))
            .collect();

        tracing::debug!(
            path = %self.status_file.display(),
            packages = packages.len(),
            "loaded package status"
        );
        *self.packages.write().unwrap_or_else(PoisonError::into_inner) = packages;
        Ok(())
    }

    fn snapshot(&self) -> PackageMap {
        self.packages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn read(path: &Path) -> Result<String, CacheError> {
    std::fs::read_to_string(path).map_err(|e| CacheError::io(path, e))
}

/// Names flagged `Auto-Installed: 1` in an extended states file.
fn auto_installed(content: &str) -> IndexSet<String> {
    parse_stanzas(content)
        .iter()
        .filter(|s| s.get("Auto-Installed").is_some_and(|v| v.trim() == "1"))
        .filter_map(|s| s.get("Package").map(str::to_string))
        .collect()
}

impl PackageCache for StatusCache {
    fn get(&self, name: &str) -> Option<PackageRef> {
        self.packages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|pkg| Arc::clone(pkg) as PackageRef)
    }

    fn packages(&self) -> Vec<PackageRef> {
        self.snapshot()
            .into_values()
            .map(|pkg| pkg as PackageRef)
            .collect()
    }

    fn commit(
        &self,
        fetch: &mut dyn FetchProgress,
        install: &mut dyn InstallProgress,
    ) -> Result<(), CacheError> {
        fetch.start();
        fetch.stop();

        let pending: Vec<_> = self
            .snapshot()
            .into_values()
            .filter_map(|pkg| pkg.take_mark().map(|mark| (pkg, mark)))
            .collect();

        install.start();
        let total = pending.len().max(1) as f64;
        for (done, (pkg, mark)) in pending.iter().enumerate() {
            let percent = (done + 1) as f64 / total * 100.0;
            install.status_change(&pkg.name, percent, mark.as_str());
        }
        install.finish();

        tracing::info!(changes = pending.len(), "committed package marks");
        Ok(())
    }
}

/// The application handed to plugins by the command-line tool.
#[derive(Debug)]
pub struct SystemApplication {
    cache: StatusCache,
}

impl SystemApplication {
    pub fn open(
        status_file: impl Into<PathBuf>,
        extended_states: impl Into<PathBuf>,
    ) -> Result<Self, CacheError> {
        Ok(Self {
            cache: StatusCache::open(status_file, extended_states)?,
        })
    }
}

impl Application for SystemApplication {
    fn cache(&self) -> &dyn PackageCache {
        &self.cache
    }

    fn refresh_cache(&self) -> Result<(), CacheError> {
        self.cache.reload()
    }

    fn notify(&self, notification: Notification) {
        tracing::info!(source = %notification.source, "{}", notification.message);
    }
}
