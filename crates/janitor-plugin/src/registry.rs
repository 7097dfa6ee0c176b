//! Registry of plugin types.
//!
//! The [`PluginRegistry`] maps a plugin kind name to a constructor. Plugin
//! source files refer to kinds by name; the manager asks the registry for a
//! fresh instance of each. Duplicate registrations are rejected.

use std::fmt;

use indexmap::IndexMap;

use crate::plugin::Plugin;
use crate::types::{PluginError, PluginResult};

/// Creates a new plugin instance with no external arguments.
pub type PluginConstructor = Box<dyn Fn() -> Box<dyn Plugin> + Send + Sync>;

/// Registry of plugin constructors, in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    constructors: IndexMap<String, PluginConstructor>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateKind`] if `kind` is already taken.
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F) -> PluginResult<()>
    where
        F: Fn() -> Box<dyn Plugin> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.constructors.contains_key(&kind) {
            return Err(PluginError::DuplicateKind { kind });
        }
        tracing::debug!(kind = %kind, "registered plugin kind");
        self.constructors.insert(kind, Box::new(constructor));
        Ok(())
    }

    /// Registers a plugin type built with [`Default`].
    pub fn register_default<P>(&mut self, kind: impl Into<String>) -> PluginResult<()>
    where
        P: Plugin + Default + 'static,
    {
        self.register(kind, || Box::new(P::default()) as Box<dyn Plugin>)
    }

    /// Creates a fresh instance of `kind`.
    pub fn create(&self, kind: &str) -> Option<Box<dyn Plugin>> {
        self.constructors.get(kind).map(|constructor| constructor())
    }

    /// Whether `kind` is registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered kind names, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Returns the number of registered kinds.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("kinds", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}
