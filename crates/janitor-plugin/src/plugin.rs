//! The plugin contract.

use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use janitor_core::{Application, Cruft};

use crate::condition::Condition;
use crate::types::{PluginError, PluginResult};

/// State every plugin carries: its condition and the shared application.
///
/// The condition can be changed on a loaded plugin; the application is
/// attached exactly once, by the manager.
#[derive(Default)]
pub struct PluginBase {
    condition: RwLock<Condition>,
    app: OnceLock<Arc<dyn Application>>,
}

impl PluginBase {
    /// Base state with no condition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Base state with an initial condition.
    pub fn with_condition(condition: impl Into<Condition>) -> Self {
        Self {
            condition: RwLock::new(condition.into()),
            app: OnceLock::new(),
        }
    }

    /// Current condition.
    pub fn condition(&self) -> Condition {
        self.condition
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the condition.
    pub fn set_condition(&self, condition: impl Into<Condition>) {
        *self
            .condition
            .write()
            .unwrap_or_else(PoisonError::into_inner) = condition.into();
    }

    /// The attached application, if any.
    pub fn app(&self) -> Option<&Arc<dyn Application>> {
        self.app.get()
    }

    /// Attach the application. Returns `false` if one was already attached.
    pub fn set_application(&self, app: Arc<dyn Application>) -> bool {
        self.app.set(app).is_ok()
    }
}

impl fmt::Debug for PluginBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginBase")
            .field("condition", &self.condition())
            .field("has_app", &self.app.get().is_some())
            .finish()
    }
}

/// A cruft detector.
///
/// Implementors provide [`Plugin::name`], [`Plugin::base`] and
/// [`Plugin::get_cruft`]; everything else has a default.
pub trait Plugin: Send + Sync {
    /// Name identifying the plugin in logs and reports.
    fn name(&self) -> &str;

    /// Shared per-plugin state.
    fn base(&self) -> &PluginBase;

    /// What the plugin looks for.
    fn description(&self) -> Option<String> {
        None
    }

    /// Scan the system and return the cruft found now.
    ///
    /// Every call scans again.
    fn get_cruft(&self) -> PluginResult<Vec<Box<dyn Cruft>>>;

    /// Bulk work after the individual cleanups of a phase have run.
    fn post_cleanup(&self) -> PluginResult<()> {
        Ok(())
    }

    /// Current condition.
    fn condition(&self) -> Condition {
        self.base().condition()
    }

    /// Replace the condition.
    fn set_condition(&self, condition: Condition) {
        self.base().set_condition(condition);
    }

    /// The application attached at load time.
    fn app(&self) -> PluginResult<&Arc<dyn Application>> {
        self.base().app().ok_or_else(|| PluginError::NoApplication {
            name: self.name().to_string(),
        })
    }

    /// Attach the application; only the first call has an effect.
    fn set_application(&self, app: Arc<dyn Application>) {
        if !self.base().set_application(app) {
            tracing::warn!(plugin = self.name(), "application already attached");
        }
    }
}

impl fmt::Debug for dyn Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name())
            .field("condition", &self.condition())
            .finish()
    }
}
