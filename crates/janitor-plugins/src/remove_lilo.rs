//! lilo left installed next to grub.

use std::path::{Path, PathBuf};

use janitor_core::{Cruft, PackageCruft};
use janitor_plugin::{Plugin, PluginBase, PluginResult};

const DESCRIPTION: &str =
    "Remove lilo since grub is also installed.(See bug #314004 for details.)";

/// Removes lilo when grub is installed and lilo has no configuration.
#[derive(Debug)]
pub struct RemoveLiloPlugin {
    base: PluginBase,
    lilo_conf: PathBuf,
}

impl Default for RemoveLiloPlugin {
    fn default() -> Self {
        Self::with_lilo_conf(crate::LILO_CONF)
    }
}

impl RemoveLiloPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `lilo_conf` instead of the system configuration file.
    pub fn with_lilo_conf(lilo_conf: impl AsRef<Path>) -> Self {
        Self {
            base: PluginBase::with_condition(vec!["jauntyPostDistUpgradeCache"]),
            lilo_conf: lilo_conf.as_ref().to_path_buf(),
        }
    }
}

impl Plugin for RemoveLiloPlugin {
    fn name(&self) -> &str {
        crate::kinds::REMOVE_LILO
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn description(&self) -> Option<String> {
        Some(DESCRIPTION.to_string())
    }

    fn get_cruft(&self) -> PluginResult<Vec<Box<dyn Cruft>>> {
        let cache = self.app()?.cache();
        let (Some(lilo), Some(grub)) = (cache.get("lilo"), cache.get("grub")) else {
            return Ok(Vec::new());
        };
        if !lilo.is_installed() || !grub.is_installed() {
            return Ok(Vec::new());
        }
        if self.lilo_conf.exists() {
            tracing::warn!(
                path = %self.lilo_conf.display(),
                "lilo and grub installed, but lilo configuration exists"
            );
            return Ok(Vec::new());
        }
        Ok(vec![Box::new(PackageCruft::new(lilo, DESCRIPTION))])
    }
}
