//! Plugin system configuration.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::condition::MatchMode;

/// System-wide plugin directory.
const SYSTEM_PLUGIN_DIR: &str = "/usr/share/janitor/plugins";

/// Configuration for plugin discovery and selection.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct PluginConfig {
    /// Directories searched for plugin sources, in order.
    #[builder(default = "default_plugin_dirs()")]
    #[serde(default = "default_plugin_dirs")]
    pub plugin_dirs: Vec<PathBuf>,

    /// How requested condition tags are compared.
    #[builder(default)]
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Abort loading on the first broken plugin source.
    ///
    /// When `false`, broken sources are skipped and reported.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub fail_fast: bool,
}

fn default_true() -> bool {
    true
}

fn default_plugin_dirs() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_PLUGIN_DIR)];
    if let Some(data_dir) = dirs::data_dir() {
        paths.push(data_dir.join("janitor").join("plugins"));
    }
    paths
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            plugin_dirs: default_plugin_dirs(),
            match_mode: MatchMode::default(),
            fail_fast: true,
        }
    }
}

impl PluginConfig {
    /// Create a new config builder.
    pub fn builder() -> PluginConfigBuilder {
        PluginConfigBuilder::default()
    }

    /// Create a config searching only `dirs`.
    pub fn with_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            plugin_dirs: dirs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}
