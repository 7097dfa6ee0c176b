//! Commit of package marks after cleanup.

use janitor_core::{Cruft, LogProgress};
use janitor_plugin::{Plugin, PluginBase, PluginResult};

/// Commits pending package changes after a cleanup phase.
///
/// Finds no cruft itself; package cruft from other plugins only marks
/// packages, and this plugin applies those marks in one commit.
#[derive(Debug, Default)]
pub struct DebPlugin {
    base: PluginBase,
}

impl DebPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for DebPlugin {
    fn name(&self) -> &str {
        crate::kinds::DEB
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn get_cruft(&self) -> PluginResult<Vec<Box<dyn Cruft>>> {
        Ok(Vec::new())
    }

    fn post_cleanup(&self) -> PluginResult<()> {
        let app = self.app()?;
        let mut fetch = LogProgress::new();
        let mut install = LogProgress::new();

        let committed = app.cache().commit(&mut fetch, &mut install);
        if let Err(err) = &committed {
            tracing::warn!(error = %err, "package commit failed");
        }
        // The cache is refreshed even when the commit fails.
        let refreshed = app.refresh_cache();

        committed?;
        refreshed?;
        Ok(())
    }
}
