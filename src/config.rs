//! Command-line tool configuration.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use derive_builder::Builder;
use janitor_plugin::PluginConfig;
use janitor_plugins::{BuiltinOptions, DPKG_STATUS_FILE, LILO_CONF};
use serde::{Deserialize, Serialize};

/// apt's record of automatically installed packages.
pub const EXTENDED_STATES_FILE: &str = "/var/lib/apt/extended_states";

/// Settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct JanitorConfig {
    /// Plugin discovery and selection.
    pub plugins: PluginConfig,

    /// dpkg status database.
    pub dpkg_status_file: PathBuf,

    /// apt extended states file.
    pub extended_states_file: PathBuf,

    /// lilo configuration file.
    pub lilo_conf: PathBuf,

    /// Command that purges obsolete dpkg status entries.
    pub forget_command: Vec<String>,

    /// Keep cleaning after an item fails.
    pub continue_on_error: bool,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        let builtin = BuiltinOptions::default();
        Self {
            plugins: PluginConfig::default(),
            dpkg_status_file: PathBuf::from(DPKG_STATUS_FILE),
            extended_states_file: PathBuf::from(EXTENDED_STATES_FILE),
            lilo_conf: PathBuf::from(LILO_CONF),
            forget_command: builtin.forget_command,
            continue_on_error: false,
        }
    }
}

impl JanitorConfig {
    /// Create a new config builder.
    pub fn builder() -> JanitorConfigBuilder {
        JanitorConfigBuilder::default()
    }

    /// Per-user configuration file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("janitor").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one the per-user file is read
    /// when present, and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Paths and commands for the built-in plugins.
    pub fn builtin_options(&self) -> BuiltinOptions {
        BuiltinOptions {
            dpkg_status_file: self.dpkg_status_file.clone(),
            forget_command: self.forget_command.clone(),
            lilo_conf: self.lilo_conf.clone(),
        }
    }
}
