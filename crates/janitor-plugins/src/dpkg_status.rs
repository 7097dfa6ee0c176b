//! Obsolete entries in the dpkg status database.

use std::path::{Path, PathBuf};
use std::process::Command;

use janitor_core::{Cruft, CruftError, CruftResult};
use janitor_plugin::{Plugin, PluginBase, PluginError, PluginResult};

use crate::control::parse_stanzas;

const OBSOLETE_STATUS: [&str; 3] = ["purge", "ok", "not-installed"];

pub(crate) fn default_forget_command() -> Vec<String> {
    vec!["dpkg".to_string(), "--forget-old-unavail".to_string()]
}

/// Stale status entries, removed by asking dpkg to forget them.
#[derive(Debug, Clone)]
pub struct DpkgStatusCruft {
    n_items: usize,
    command: Vec<String>,
}

impl DpkgStatusCruft {
    pub fn new(n_items: usize) -> Self {
        Self {
            n_items,
            command: default_forget_command(),
        }
    }

    /// Replace the program and arguments run on cleanup.
    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }
}

impl Cruft for DpkgStatusCruft {
    fn prefix(&self) -> &str {
        "dpkg-status"
    }

    fn prefix_description(&self) -> Option<String> {
        Some(format!("{} obsolete entries in the status file", self.n_items))
    }

    fn shortname(&self) -> String {
        "Obsolete entries in dpkg status".to_string()
    }

    fn description(&self) -> String {
        "Obsolete dpkg status entries".to_string()
    }

    fn cleanup(&mut self) -> CruftResult<()> {
        let command = self.command.join(" ");
        let Some((program, args)) = self.command.split_first() else {
            return Err(CruftError::Command {
                command,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        tracing::debug!(command = %command, "forgetting obsolete status entries");
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| CruftError::Command {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            tracing::debug!(command = %command, %status, "command finished");
        } else {
            tracing::warn!(command = %command, %status, "command returned failure");
        }
        Ok(())
    }
}

/// Counts status entries left behind by purged packages.
#[derive(Debug)]
pub struct DpkgStatusPlugin {
    base: PluginBase,
    status_file: PathBuf,
    forget_command: Vec<String>,
}

impl Default for DpkgStatusPlugin {
    fn default() -> Self {
        Self::with_status_file(crate::DPKG_STATUS_FILE)
    }
}

impl DpkgStatusPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `status_file` instead of the system database.
    pub fn with_status_file(status_file: impl AsRef<Path>) -> Self {
        Self {
            base: PluginBase::with_condition(vec!["PostCleanup"]),
            status_file: status_file.as_ref().to_path_buf(),
            forget_command: default_forget_command(),
        }
    }

    /// Command given to the cruft this plugin finds.
    pub fn with_forget_command(mut self, command: Vec<String>) -> Self {
        self.forget_command = command;
        self
    }

    pub fn status_file(&self) -> &Path {
        &self.status_file
    }
}

/// Number of stanzas whose status is exactly `purge ok not-installed`.
fn count_obsolete(content: &str) -> usize {
    parse_stanzas(content)
        .iter()
        .filter(|stanza| {
            let Some(status) = stanza.get("Status") else {
                return false;
            };
            let words: Vec<&str> = status.split_whitespace().collect();
            if words.len() != OBSOLETE_STATUS.len() {
                tracing::debug!(status, "skipping malformed status field");
                return false;
            }
            words == OBSOLETE_STATUS
        })
        .count()
}

impl Plugin for DpkgStatusPlugin {
    fn name(&self) -> &str {
        crate::kinds::DPKG_STATUS
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn get_cruft(&self) -> PluginResult<Vec<Box<dyn Cruft>>> {
        let content = std::fs::read_to_string(&self.status_file)
            .map_err(|e| PluginError::io(&self.status_file, e))?;
        let n_items = count_obsolete(&content);
        tracing::debug!(count = n_items, "obsolete dpkg status entries");

        if n_items == 0 {
            return Ok(Vec::new());
        }
        let cruft = DpkgStatusCruft::new(n_items).with_command(self.forget_command.clone());
        Ok(vec![Box::new(cruft)])
    }
}
