//! The cruft abstraction.

use std::fmt;

use crate::error::CruftResult;

/// One concrete removable or fixable artifact.
///
/// Plugins create fresh cruft on every detection pass. A cruft value holds
/// just enough to act on its artifact (a path, a package handle) and has no
/// link back to the plugin that produced it.
pub trait Cruft: fmt::Debug + Send {
    /// Short, fixed tag identifying the kind of cruft (e.g. `"file"`).
    fn prefix(&self) -> &str;

    /// One-line description of the kind, if the kind has one.
    fn prefix_description(&self) -> Option<String> {
        None
    }

    /// Identifier of this particular instance (a path, a package name).
    fn shortname(&self) -> String;

    /// Longer, possibly multi-line, explanation.
    fn description(&self) -> String;

    /// Bytes reclaimed by cleaning this up, when meaningful.
    fn disk_usage(&self) -> Option<u64> {
        None
    }

    /// Remove or fix the artifact.
    ///
    /// Callers invoke this at most once per instance.
    fn cleanup(&mut self) -> CruftResult<()>;
}

/// Derived cruft properties.
///
/// Blanket-implemented for every [`Cruft`] so the derived values cannot be
/// overridden by a cruft kind.
pub trait CruftExt: Cruft {
    /// Unique name within one detection run: `prefix:shortname`.
    ///
    /// Recomputed on every call.
    fn name(&self) -> String {
        format!("{}:{}", self.prefix(), self.shortname())
    }
}

impl<T: Cruft + ?Sized> CruftExt for T {}
