//! Plugin source files.
//!
//! A plugin source is a TOML file named `<anything>_plugin.toml`. Each
//! `[[plugin]]` table names a registered kind and may override its
//! condition:
//!
//! ```toml
//! [[plugin]]
//! kind = "dpkg_status"
//! condition = ["PostCleanup"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::plugin::Plugin;
use crate::registry::PluginRegistry;
use crate::types::{PluginError, PluginResult};

/// File name suffix that marks a plugin source.
pub const PLUGIN_SUFFIX: &str = "_plugin.toml";

/// Whether `path` follows the plugin source naming convention.
pub fn is_plugin_source(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(PLUGIN_SUFFIX))
}

/// One plugin declared by a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginEntry {
    /// Registry kind to instantiate.
    pub kind: String,

    /// Condition override; absent keeps the plugin's own default.
    #[serde(default)]
    pub condition: Option<Condition>,
}

/// Parsed content of a plugin source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginSource {
    /// Declared plugins, in file order.
    #[serde(default, rename = "plugin")]
    pub plugins: Vec<PluginEntry>,
}

impl PluginSource {
    /// Parse source text; `path` is only used for error context.
    pub fn parse(path: &Path, content: &str) -> PluginResult<Self> {
        toml::from_str(content).map_err(|e| PluginError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and parse a source file.
    pub fn load(path: &Path) -> PluginResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PluginError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(path, &content)
    }

    /// Create every declared plugin, applying condition overrides.
    ///
    /// All kinds are resolved before anything is returned: one unknown kind
    /// fails the whole file.
    pub fn instantiate(
        &self,
        path: &Path,
        registry: &PluginRegistry,
    ) -> PluginResult<Vec<Box<dyn Plugin>>> {
        self.plugins
            .iter()
            .map(|entry| {
                let plugin = registry
                    .create(&entry.kind)
                    .ok_or_else(|| PluginError::UnknownKind {
                        path: path.to_path_buf(),
                        kind: entry.kind.clone(),
                    })?;
                if let Some(condition) = &entry.condition {
                    plugin.set_condition(condition.clone());
                }
                Ok(plugin)
            })
            .collect()
    }
}
