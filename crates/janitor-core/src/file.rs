//! Cruft that is an individual file.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use crate::cruft::Cruft;
use crate::error::{CruftError, CruftResult};

/// A file on disk that should be removed.
///
/// Any plugin may decide a file is cruft, whatever its reason; the reason is
/// carried in the description.
#[derive(Debug, Clone)]
pub struct FileCruft {
    path: PathBuf,
    disk_usage: u64,
    description: String,
}

impl FileCruft {
    /// Create file cruft, capturing the file's disk usage now.
    pub fn new(path: impl Into<PathBuf>, description: impl Into<String>) -> CruftResult<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path).map_err(|e| CruftError::io(&path, e))?;
        Ok(Self {
            disk_usage: disk_usage(&metadata),
            path,
            description: description.into(),
        })
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Cruft for FileCruft {
    fn prefix(&self) -> &str {
        "file"
    }

    fn prefix_description(&self) -> Option<String> {
        Some("A file on disk".to_string())
    }

    fn shortname(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    fn description(&self) -> String {
        format!("{}\n", self.description)
    }

    fn disk_usage(&self) -> Option<u64> {
        Some(self.disk_usage)
    }

    fn cleanup(&mut self) -> CruftResult<()> {
        tracing::info!(path = %self.path.display(), "removing file");
        std::fs::remove_file(&self.path).map_err(|e| CruftError::io(&self.path, e))
    }
}

/// Allocated size in 512-byte blocks.
#[cfg(unix)]
fn disk_usage(metadata: &Metadata) -> u64 {
    metadata.blocks() * 512
}

#[cfg(not(unix))]
fn disk_usage(metadata: &Metadata) -> u64 {
    metadata.len()
}
