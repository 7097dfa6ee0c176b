//! The scan and cleanup cycle.

use std::sync::Arc;

use derive_builder::Builder;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use janitor_core::{Cruft, CruftExt};
use janitor_plugin::{ConditionQuery, Plugin, PluginManager, PluginResult};

use crate::report::{CleanupFailure, CycleReport};

/// How a cycle treats the items it cleans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(default)]
pub struct CycleOptions {
    /// Report what would be cleaned without cleaning or committing.
    #[serde(default)]
    pub dry_run: bool,

    /// Keep cleaning after an item fails.
    #[serde(default)]
    pub continue_on_error: bool,
}

impl CycleOptions {
    /// Create a new options builder.
    pub fn builder() -> CycleOptionsBuilder {
        CycleOptionsBuilder::default()
    }
}

/// A cruft item together with the plugin that found it.
#[derive(Debug)]
pub struct FoundCruft {
    pub plugin: String,
    pub cruft: Box<dyn Cruft>,
}

impl FoundCruft {
    pub fn name(&self) -> String {
        self.cruft.name()
    }
}

/// Which found items to clean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    All,
    #[default]
    Nothing,
    /// Items whose full name is in the set.
    Names(IndexSet<String>),
}

impl Selection {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    pub fn selects(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Nothing => false,
            Self::Names(names) => names.contains(name),
        }
    }
}

/// One pass over the plugins matching a condition.
#[derive(Debug)]
pub struct CleanupCycle {
    options: CycleOptions,
    plugins: Vec<Arc<dyn Plugin>>,
    found: Vec<FoundCruft>,
}

impl CleanupCycle {
    /// Select plugins by `query` and collect their cruft with default options.
    pub fn scan(
        manager: &mut PluginManager,
        query: impl Into<ConditionQuery>,
    ) -> PluginResult<Self> {
        Self::scan_with_options(manager, query, CycleOptions::default())
    }

    /// Select plugins by `query` and collect their cruft.
    ///
    /// Items keep plugin order, then the order each plugin yields them. A
    /// plugin that fails to scan aborts the whole scan.
    pub fn scan_with_options(
        manager: &mut PluginManager,
        query: impl Into<ConditionQuery>,
        options: CycleOptions,
    ) -> PluginResult<Self> {
        let plugins = manager.get_plugins(query)?;
        let mut found = Vec::new();

        for plugin in &plugins {
            let cruft = plugin.get_cruft()?;
            tracing::debug!(plugin = plugin.name(), count = cruft.len(), "scanned plugin");
            found.extend(cruft.into_iter().map(|cruft| FoundCruft {
                plugin: plugin.name().to_string(),
                cruft,
            }));
        }

        tracing::info!(plugins = plugins.len(), cruft = found.len(), "scan complete");
        Ok(Self {
            options,
            plugins,
            found,
        })
    }

    pub fn options(&self) -> &CycleOptions {
        &self.options
    }

    /// Plugins matched by the scan, in order.
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    /// Cruft still pending, in scan order.
    pub fn found(&self) -> &[FoundCruft] {
        &self.found
    }

    /// Clean the selected items, then run every plugin's post-cleanup step.
    ///
    /// Successfully cleaned items are removed from [`found`](Self::found).
    /// In dry-run mode nothing is cleaned and post-cleanup steps are not run.
    pub fn cleanup(&mut self, selection: &Selection) -> CycleReport {
        let mut report = CycleReport {
            dry_run: self.options.dry_run,
            ..CycleReport::default()
        };

        if let Selection::Names(names) = selection {
            report.unmatched = names
                .iter()
                .filter(|name| !self.found.iter().any(|f| &f.name() == *name))
                .cloned()
                .collect();
        }

        let mut stopped = false;
        let mut remaining = Vec::new();
        for mut item in std::mem::take(&mut self.found) {
            let name = item.name();
            if !selection.selects(&name) {
                remaining.push(item);
                continue;
            }
            if stopped {
                report.skipped += 1;
                remaining.push(item);
                continue;
            }

            let size = item.cruft.disk_usage();
            if self.options.dry_run {
                tracing::info!(cruft = %name, "would clean");
                report.cleaned.push(name);
                report.bytes_freed += size.unwrap_or(0);
                remaining.push(item);
                continue;
            }

            match item.cruft.cleanup() {
                Ok(()) => {
                    tracing::info!(cruft = %name, plugin = %item.plugin, "cleaned");
                    report.cleaned.push(name);
                    report.bytes_freed += size.unwrap_or(0);
                }
                Err(err) => {
                    tracing::warn!(cruft = %name, error = %err, "cleanup failed");
                    report.failures.push(CleanupFailure::new(name, err.to_string()));
                    stopped = !self.options.continue_on_error;
                    remaining.push(item);
                }
            }
        }
        self.found = remaining;

        if !self.options.dry_run {
            self.post_cleanup(&mut report);
        }

        tracing::info!(summary = %report.summary(), "cleanup cycle finished");
        report
    }

    fn post_cleanup(&self, report: &mut CycleReport) {
        for plugin in &self.plugins {
            if let Err(err) = plugin.post_cleanup() {
                tracing::warn!(plugin = plugin.name(), error = %err, "post-cleanup failed");
                report
                    .post_cleanup_failures
                    .push(CleanupFailure::new(plugin.name(), err.to_string()));
            }
        }
    }
}
