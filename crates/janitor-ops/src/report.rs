//! Cycle results.

use serde::{Deserialize, Serialize};

use janitor_core::CruftExt;

use crate::cycle::FoundCruft;

/// A cleanup or post-cleanup step that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupFailure {
    /// Cruft name, or plugin name for post-cleanup failures.
    pub name: String,
    /// A human-readable error message.
    pub message: String,
}

impl CleanupFailure {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CleanupFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Outcome of [`CleanupCycle::cleanup`](crate::CleanupCycle::cleanup).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Whether cleanups were only reported.
    pub dry_run: bool,
    /// Names of the cruft cleaned, in order.
    pub cleaned: Vec<String>,
    /// Items whose cleanup failed.
    pub failures: Vec<CleanupFailure>,
    /// Selected items not attempted after a failure.
    pub skipped: usize,
    /// Selected names that matched no found cruft.
    pub unmatched: Vec<String>,
    /// Known disk usage of the cleaned items.
    pub bytes_freed: u64,
    /// Plugins whose post-cleanup step failed.
    pub post_cleanup_failures: Vec<CleanupFailure>,
}

impl CycleReport {
    /// Whether every attempted step succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.post_cleanup_failures.is_empty()
    }

    /// Get a human-readable summary of the cycle.
    pub fn summary(&self) -> String {
        let action = if self.dry_run { "Would clean" } else { "Cleaned" };
        let mut summary = format!("{} {} items", action, self.cleaned.len());
        if !self.failures.is_empty() {
            summary.push_str(&format!(", {} failed", self.failures.len()));
        }
        if self.skipped > 0 {
            summary.push_str(&format!(", {} skipped", self.skipped));
        }
        if !self.post_cleanup_failures.is_empty() {
            summary.push_str(&format!(
                ", {} post-cleanup failures",
                self.post_cleanup_failures.len()
            ));
        }
        summary
    }
}

/// Serializable view of a found cruft item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CruftInfo {
    pub plugin: String,
    pub name: String,
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_description: Option<String>,
    pub shortname: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_usage: Option<u64>,
}

impl From<&FoundCruft> for CruftInfo {
    fn from(found: &FoundCruft) -> Self {
        let cruft = found.cruft.as_ref();
        Self {
            plugin: found.plugin.clone(),
            name: cruft.name(),
            prefix: cruft.prefix().to_string(),
            prefix_description: cruft.prefix_description(),
            shortname: cruft.shortname(),
            description: cruft.description(),
            disk_usage: cruft.disk_usage(),
        }
    }
}
