//! Language packs pulled in as dependencies that should be kept.

use janitor_core::{Cruft, CruftResult, PackageRef};
use janitor_plugin::{Plugin, PluginBase, PluginResult};

/// A package that must be marked as manually installed.
#[derive(Debug, Clone)]
pub struct ManualInstallCruft {
    package: PackageRef,
}

impl ManualInstallCruft {
    pub fn new(package: PackageRef) -> Self {
        Self { package }
    }

    pub fn package(&self) -> &PackageRef {
        &self.package
    }
}

impl Cruft for ManualInstallCruft {
    fn prefix(&self) -> &str {
        "mark-manually-installed"
    }

    fn shortname(&self) -> String {
        self.package.name().to_string()
    }

    fn description(&self) -> String {
        format!(
            "{} needs to be marked as manually installed.",
            self.package.name()
        )
    }

    fn cleanup(&mut self) -> CruftResult<()> {
        self.package.mark_keep()?;
        self.package.mark_install()?;
        Ok(())
    }
}

/// Marks auto-installed language packs as manually installed.
///
/// Their reverse dependencies were relaxed to suggestions, which would
/// otherwise make them candidates for autoremoval.
#[derive(Debug)]
pub struct MarkLangpacksManuallyInstalledPlugin {
    base: PluginBase,
}

impl Default for MarkLangpacksManuallyInstalledPlugin {
    fn default() -> Self {
        Self {
            base: PluginBase::with_condition(vec!["from_hardyPostDistUpgradeCache"]),
        }
    }
}

impl MarkLangpacksManuallyInstalledPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_language_pack(name: &str) -> bool {
    name.starts_with("language-pack-") && !name.ends_with("-base")
}

impl Plugin for MarkLangpacksManuallyInstalledPlugin {
    fn name(&self) -> &str {
        crate::kinds::LANGPACK_MANUAL
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn get_cruft(&self) -> PluginResult<Vec<Box<dyn Cruft>>> {
        let cache = self.app()?.cache();
        Ok(cache
            .packages()
            .into_iter()
            .filter(|pkg| {
                is_language_pack(pkg.name()) && pkg.is_auto_installed() && pkg.is_installed()
            })
            .map(|pkg| {
                tracing::debug!(package = pkg.name(), "marking as manually installed");
                Box::new(ManualInstallCruft::new(pkg)) as Box<dyn Cruft>
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_pack_names() {
        assert!(is_language_pack("language-pack-de"));
        assert!(is_language_pack("language-pack-gnome-fr"));
        assert!(!is_language_pack("language-pack-de-base"));
        assert!(!is_language_pack("language-support-de"));
    }
}
