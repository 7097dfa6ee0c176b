//! Plugin discovery, loading and selection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use janitor_core::Application;

use crate::condition::ConditionQuery;
use crate::config::PluginConfig;
use crate::plugin::Plugin;
use crate::registry::PluginRegistry;
use crate::source::{PluginSource, is_plugin_source};
use crate::types::PluginResult;

/// Discovers plugin sources, loads them once, and selects plugins by
/// condition.
///
/// Every loaded plugin shares the manager's application handle. Plugins are
/// kept in discovery order: directory order, then file name order within a
/// directory, then declaration order within a file.
pub struct PluginManager {
    app: Arc<dyn Application>,
    registry: PluginRegistry,
    config: PluginConfig,
    /// `None` until the one-time load pass has succeeded.
    plugins: Option<Vec<Arc<dyn Plugin>>>,
    skipped: Vec<PathBuf>,
}

impl PluginManager {
    /// Create a manager searching `plugin_dirs` with default settings.
    pub fn new<I, P>(app: Arc<dyn Application>, registry: PluginRegistry, plugin_dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::with_config(app, registry, PluginConfig::with_dirs(plugin_dirs))
    }

    /// Create a manager from a full configuration.
    pub fn with_config(
        app: Arc<dyn Application>,
        registry: PluginRegistry,
        config: PluginConfig,
    ) -> Self {
        Self {
            app,
            registry,
            config,
            plugins: None,
            skipped: Vec::new(),
        }
    }

    /// The shared application.
    pub fn app(&self) -> &Arc<dyn Application> {
        &self.app
    }

    /// The configuration in use.
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// The plugin type registry.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Whether the load pass has run.
    pub fn is_loaded(&self) -> bool {
        self.plugins.is_some()
    }

    /// Source files skipped during loading because they were broken.
    ///
    /// Always empty when `fail_fast` is set.
    pub fn skipped_files(&self) -> &[PathBuf] {
        &self.skipped
    }

    /// Plugin source files currently present, in discovery order.
    ///
    /// Missing directories contribute nothing. Recomputed on every call.
    pub fn plugin_files(&self) -> Vec<PathBuf> {
        self.config
            .plugin_dirs
            .iter()
            .flat_map(|dir| sources_in(dir))
            .collect()
    }

    /// Plugins selected by `query`, loading them on first use.
    pub fn get_plugins(
        &mut self,
        query: impl Into<ConditionQuery>,
    ) -> PluginResult<Vec<Arc<dyn Plugin>>> {
        self.select(query.into(), None)
    }

    /// Like [`get_plugins`](Self::get_plugins), reporting load progress.
    ///
    /// `callback(path, index, total)` fires once per source file during the
    /// load pass. It is not called when plugins are already loaded.
    pub fn get_plugins_with_callback(
        &mut self,
        query: impl Into<ConditionQuery>,
        callback: &mut dyn FnMut(&Path, usize, usize),
    ) -> PluginResult<Vec<Arc<dyn Plugin>>> {
        self.select(query.into(), Some(callback))
    }

    fn select(
        &mut self,
        query: ConditionQuery,
        callback: Option<&mut dyn FnMut(&Path, usize, usize)>,
    ) -> PluginResult<Vec<Arc<dyn Plugin>>> {
        let mode = self.config.match_mode;
        let plugins = self.load(callback)?;
        let selected: Vec<_> = plugins
            .iter()
            .filter(|plugin| query.selects(&plugin.condition(), mode))
            .cloned()
            .collect();
        tracing::debug!(
            query = ?query,
            selected = selected.len(),
            loaded = plugins.len(),
            "selected plugins"
        );
        Ok(selected)
    }

    fn load(
        &mut self,
        mut callback: Option<&mut dyn FnMut(&Path, usize, usize)>,
    ) -> PluginResult<&[Arc<dyn Plugin>]> {
        if self.plugins.is_none() {
            let files = self.plugin_files();
            let total = files.len();
            let mut loaded = Vec::new();
            let mut skipped = Vec::new();

            for (index, path) in files.iter().enumerate() {
                if let Some(callback) = callback.as_mut() {
                    callback(path, index, total);
                }

                match self.load_file(path) {
                    Ok(plugins) => loaded.extend(plugins),
                    Err(err) if !self.config.fail_fast => {
                        tracing::warn!(path = %path.display(), error = %err, "skipping plugin source");
                        skipped.push(path.clone());
                    }
                    Err(err) => return Err(err),
                }
            }

            tracing::debug!(files = total, plugins = loaded.len(), "loaded plugins");
            self.skipped = skipped;
            self.plugins = Some(loaded);
        }

        Ok(self.plugins.as_deref().unwrap_or_default())
    }

    fn load_file(&self, path: &Path) -> PluginResult<Vec<Arc<dyn Plugin>>> {
        let source = PluginSource::load(path)?;
        let plugins = source.instantiate(path, &self.registry)?;
        Ok(plugins
            .into_iter()
            .map(|plugin| {
                plugin.set_application(Arc::clone(&self.app));
                tracing::debug!(plugin = plugin.name(), path = %path.display(), "loaded plugin");
                Arc::from(plugin)
            })
            .collect())
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("loaded", &self.plugins.as_ref().map(Vec::len))
            .finish()
    }
}

/// Plugin sources directly inside `dir`, sorted by file name.
fn sources_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            tracing::debug!(dir = %dir.display(), error = %err, "cannot read plugin directory");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| is_plugin_source(path) && path.is_file())
        .map(|path| std::path::absolute(&path).unwrap_or(path))
        .collect();
    files.sort();
    files
}
