//! Progress reporting for package cache commits.

/// Receives download progress while a commit fetches packages.
pub trait FetchProgress {
    /// A fetch is starting.
    fn start(&mut self) {}

    /// One item finished downloading.
    fn item_done(&mut self, _uri: &str, _bytes: u64) {}

    /// All fetching is done.
    fn stop(&mut self) {}
}

/// Receives progress while a commit installs or removes packages.
pub trait InstallProgress {
    /// Installation is starting.
    fn start(&mut self) {}

    /// Status update for a package.
    fn status_change(&mut self, _package: &str, _percent: f64, _status: &str) {}

    /// Installation is done.
    fn finish(&mut self) {}
}

/// Progress reporter that emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl LogProgress {
    /// Create a new logging reporter.
    pub fn new() -> Self {
        Self
    }
}

impl FetchProgress for LogProgress {
    fn start(&mut self) {
        tracing::info!(target: "janitor::commit", "fetching packages");
    }

    fn item_done(&mut self, uri: &str, bytes: u64) {
        tracing::debug!(target: "janitor::commit", uri, bytes, "fetched");
    }

    fn stop(&mut self) {
        tracing::info!(target: "janitor::commit", "fetch complete");
    }
}

impl InstallProgress for LogProgress {
    fn start(&mut self) {
        tracing::info!(target: "janitor::commit", "applying package changes");
    }

    fn status_change(&mut self, package: &str, percent: f64, status: &str) {
        tracing::debug!(target: "janitor::commit", package, percent, "{status}");
    }

    fn finish(&mut self) {
        tracing::info!(target: "janitor::commit", "package changes applied");
    }
}
