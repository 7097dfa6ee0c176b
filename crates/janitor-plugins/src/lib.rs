//! Built-in cruft detectors for janitor.
//!
//! Each detector is registered under a kind name; plugin source files refer
//! to these names. The sources shipped in `data/plugins` enable all of them.

mod control;
mod deb;
mod dpkg_status;
mod kdelibs;
mod langpack_manual;
mod remove_lilo;

use std::path::PathBuf;

use janitor_plugin::{Plugin, PluginRegistry, PluginResult};

pub use control::{Stanza, parse_stanzas};
pub use deb::DebPlugin;
pub use dpkg_status::{DpkgStatusCruft, DpkgStatusPlugin};
pub use kdelibs::Kdelibs4devToKdelibs5devPlugin;
pub use langpack_manual::{ManualInstallCruft, MarkLangpacksManuallyInstalledPlugin};
pub use remove_lilo::RemoveLiloPlugin;

/// Default location of the dpkg status database.
pub const DPKG_STATUS_FILE: &str = "/var/lib/dpkg/status";

/// Default lilo configuration file.
pub const LILO_CONF: &str = "/etc/lilo.conf";

/// Kind names of the built-in plugins.
pub mod kinds {
    pub const DEB: &str = "deb";
    pub const DPKG_STATUS: &str = "dpkg_status";
    pub const KDELIBS4TO5: &str = "kdelibs4to5";
    pub const LANGPACK_MANUAL: &str = "langpack_manual";
    pub const REMOVE_LILO: &str = "remove_lilo";
}

/// System paths and commands the built-in plugins use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinOptions {
    /// dpkg status database read by the status plugin.
    pub dpkg_status_file: PathBuf,
    /// Command that purges obsolete status entries.
    pub forget_command: Vec<String>,
    /// lilo configuration whose presence keeps lilo installed.
    pub lilo_conf: PathBuf,
}

impl Default for BuiltinOptions {
    fn default() -> Self {
        Self {
            dpkg_status_file: PathBuf::from(DPKG_STATUS_FILE),
            forget_command: dpkg_status::default_forget_command(),
            lilo_conf: PathBuf::from(LILO_CONF),
        }
    }
}

/// Register every built-in plugin kind.
pub fn register_builtins(registry: &mut PluginRegistry, options: &BuiltinOptions) -> PluginResult<()> {
    registry.register_default::<DebPlugin>(kinds::DEB)?;

    let status_file = options.dpkg_status_file.clone();
    let forget_command = options.forget_command.clone();
    registry.register(kinds::DPKG_STATUS, move || {
        Box::new(
            DpkgStatusPlugin::with_status_file(&status_file)
                .with_forget_command(forget_command.clone()),
        ) as Box<dyn Plugin>
    })?;

    registry.register_default::<Kdelibs4devToKdelibs5devPlugin>(kinds::KDELIBS4TO5)?;
    registry.register_default::<MarkLangpacksManuallyInstalledPlugin>(kinds::LANGPACK_MANUAL)?;

    let lilo_conf = options.lilo_conf.clone();
    registry.register(kinds::REMOVE_LILO, move || {
        Box::new(RemoveLiloPlugin::with_lilo_conf(&lilo_conf)) as Box<dyn Plugin>
    })?;

    Ok(())
}

/// A registry holding exactly the built-in plugin kinds.
pub fn builtin_registry(options: &BuiltinOptions) -> PluginResult<PluginRegistry> {
    let mut registry = PluginRegistry::new();
    register_builtins(&mut registry, options)?;
    Ok(registry)
}
