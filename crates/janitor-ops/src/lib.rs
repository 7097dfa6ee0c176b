//! Scan and cleanup cycle for janitor.
//!
//! A [`CleanupCycle`] selects plugins by condition, collects their cruft,
//! cleans the items the caller picks and then lets every selected plugin
//! run its post-cleanup step.

mod cycle;
mod report;

pub use cycle::{CleanupCycle, CycleOptions, CycleOptionsBuilder, FoundCruft, Selection};
pub use report::{CleanupFailure, CruftInfo, CycleReport};
