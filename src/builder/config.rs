//! Fluent construction of machine configurations.

use crate::core::{Config, Effect, Guard, GuardParams};
use crate::diagnostics::{Console, Verbosity};
use crate::effects::{Cleanup, EffectParams};
use std::rc::Rc;

/// Builder for [`Config`].
///
/// # Example
///
/// ```rust
/// use switchyard::builder::ConfigBuilder;
/// use switchyard::diagnostics::Verbosity;
///
/// let config = ConfigBuilder::<u32>::new()
///     .guard("isPositive", |p| *p.context > 0)
///     .effect("onActive", |_| None)
///     .verbose(2)
///     .build();
///
/// assert!(config.guard("isPositive").is_some());
/// assert_eq!(config.verbosity(), Verbosity::All);
/// ```
pub struct ConfigBuilder<C> {
    config: Config<C>,
}

impl<C> ConfigBuilder<C> {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Register a named guard. Registering a name twice keeps the last.
    pub fn guard<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&GuardParams<'_, C>) -> bool + 'static,
    {
        self.config.guards.insert(name.into(), Guard::new(predicate));
        self
    }

    /// Register a named entry effect.
    pub fn effect<F>(mut self, name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&EffectParams<C>) -> Option<Cleanup<C>> + 'static,
    {
        self.config.effects.insert(name.into(), Effect::new(run));
        self
    }

    /// Accepts a [`Verbosity`], a `bool` (`true` logs everything) or a level
    /// `0..=2`.
    pub fn verbose(mut self, verbosity: impl Into<Verbosity>) -> Self {
        self.config.verbosity = verbosity.into();
        self
    }

    pub fn console(mut self, console: Rc<dyn Console>) -> Self {
        self.config.console = console;
        self
    }

    /// Trace and explain guard denials. Defaults to on in debug builds.
    pub fn development(mut self, development: bool) -> Self {
        self.config.development = development;
        self
    }

    pub fn build(self) -> Config<C> {
        self.config
    }
}

impl<C> Default for ConfigBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Config<C> {
    pub fn builder() -> ConfigBuilder<C> {
        ConfigBuilder::new()
    }
}
