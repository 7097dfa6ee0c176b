//! Plugin system for janitor.
//!
//! Plugins are independently written cruft detectors. Their types are
//! registered at compile time in a [`PluginRegistry`]; plugin *source files*
//! (`*_plugin.toml`) found in the configured directories decide which of
//! those types are instantiated, and under which [`Condition`].
//!
//! # Architecture
//!
//! - [`Plugin`]: the detector contract (`get_cruft`, `post_cleanup`).
//! - [`PluginRegistry`]: kind name to constructor.
//! - [`PluginSource`]: the parsed content of one plugin source file.
//! - [`PluginManager`]: discovers source files, loads them once, and selects
//!   plugins by [`ConditionQuery`].
//!
//! # Example
//!
//! ```ignore
//! use janitor_plugin::{ConditionQuery, PluginManager, PluginRegistry};
//!
//! let mut manager = PluginManager::new(app, registry, ["/usr/share/janitor/plugins"]);
//!
//! for plugin in manager.get_plugins(ConditionQuery::named("PostCleanup"))? {
//!     for cruft in plugin.get_cruft()? {
//!         println!("{}", cruft.name());
//!     }
//! }
//! ```

mod condition;
mod config;
mod manager;
mod plugin;
mod registry;
mod source;
mod types;

pub use condition::{Condition, ConditionQuery, MatchMode, WILDCARD};
pub use config::{PluginConfig, PluginConfigBuilder};
pub use manager::PluginManager;
pub use plugin::{Plugin, PluginBase};
pub use registry::{PluginConstructor, PluginRegistry};
pub use source::{PLUGIN_SUFFIX, PluginEntry, PluginSource, is_plugin_source};
pub use types::{PluginError, PluginResult};
