//! kdelibs5-dev for systems that still carry kdelibs4-dev.

use janitor_core::{Cruft, MissingPackageCruft};
use janitor_plugin::{Plugin, PluginBase, PluginResult};

const FROM: &str = "kdelibs4-dev";
const TO: &str = "kdelibs5-dev";

const REASON: &str = "When upgrading, if kdelibs4-dev is installed, kdelibs5-dev needs to be \
                      installed. See bugs.launchpad.net, bug #279621 for details.";

/// Installs kdelibs5-dev when kdelibs4-dev is present.
#[derive(Debug)]
pub struct Kdelibs4devToKdelibs5devPlugin {
    base: PluginBase,
}

impl Default for Kdelibs4devToKdelibs5devPlugin {
    fn default() -> Self {
        Self {
            base: PluginBase::with_condition(vec!["from_hardyPostDistUpgradeCache"]),
        }
    }
}

impl Kdelibs4devToKdelibs5devPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for Kdelibs4devToKdelibs5devPlugin {
    fn name(&self) -> &str {
        crate::kinds::KDELIBS4TO5
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn get_cruft(&self) -> PluginResult<Vec<Box<dyn Cruft>>> {
        let cache = self.app()?.cache();
        let (Some(from), Some(to)) = (cache.get(FROM), cache.get(TO)) else {
            return Ok(Vec::new());
        };
        if !from.is_installed() || to.is_installed() {
            return Ok(Vec::new());
        }
        Ok(vec![Box::new(MissingPackageCruft::with_description(to, REASON))])
    }
}
