//! Machine configuration: named guards, named effects and diagnostics.

use super::event::Event;
use super::machine_state::Context;
use crate::diagnostics::{Console, Reporter, TracingConsole, Verbosity};
use crate::effects::{Cleanup, EffectParams};
use crate::guard::{GuardError, Predicates};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Input passed to every guard predicate.
#[derive(Debug)]
pub struct GuardParams<'a, C> {
    pub event: &'a Event,
    pub context: &'a C,
}

impl<C> Clone for GuardParams<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for GuardParams<'_, C> {}

/// Named predicate referenced from guard expressions.
///
/// Guards should be pure: the diagnostic tracer may evaluate the same
/// guard expression a second time and expects identical answers.
///
/// # Example
///
/// ```rust
/// use switchyard::core::{Event, Guard, GuardParams};
///
/// let is_positive = Guard::new(|p: &GuardParams<'_, i32>| *p.context > 0);
/// let event = Event::new("TICK");
///
/// assert!(is_positive.check(&GuardParams { event: &event, context: &1 }));
/// assert!(!is_positive.check(&GuardParams { event: &event, context: &0 }));
/// ```
pub struct Guard<C> {
    predicate: Rc<dyn Fn(&GuardParams<'_, C>) -> bool>,
}

impl<C> Guard<C> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&GuardParams<'_, C>) -> bool + 'static,
    {
        Guard {
            predicate: Rc::new(predicate),
        }
    }

    pub fn check(&self, params: &GuardParams<'_, C>) -> bool {
        (self.predicate)(params)
    }
}

impl<C> Clone for Guard<C> {
    fn clone(&self) -> Self {
        Self {
            predicate: Rc::clone(&self.predicate),
        }
    }
}

/// Named entry effect, optionally returning a cleanup run on exit.
pub struct Effect<C> {
    run: Rc<dyn Fn(&EffectParams<C>) -> Option<Cleanup<C>>>,
}

impl<C> Effect<C> {
    pub fn new<F>(run: F) -> Self
    where
        F: Fn(&EffectParams<C>) -> Option<Cleanup<C>> + 'static,
    {
        Effect { run: Rc::new(run) }
    }

    pub fn run(&self, params: &EffectParams<C>) -> Option<Cleanup<C>> {
        (self.run)(params)
    }
}

impl<C> Clone for Effect<C> {
    fn clone(&self) -> Self {
        Self {
            run: Rc::clone(&self.run),
        }
    }
}

/// Guards, effects and logging options for a machine.
///
/// Built with [`Config::builder`](crate::builder::ConfigBuilder).
pub struct Config<C> {
    pub(crate) guards: HashMap<String, Guard<C>>,
    pub(crate) effects: HashMap<String, Effect<C>>,
    pub(crate) verbosity: Verbosity,
    pub(crate) console: Rc<dyn Console>,
    pub(crate) development: bool,
}

impl<C> Config<C> {
    pub fn guard(&self, name: &str) -> Option<&Guard<C>> {
        self.guards.get(name)
    }

    pub fn effect(&self, name: &str) -> Option<&Effect<C>> {
        self.effects.get(name)
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Whether guard denials are traced and explained.
    pub fn is_development(&self) -> bool {
        self.development
    }

    pub fn reporter(&self) -> Reporter {
        Reporter::new(Rc::clone(&self.console), self.verbosity)
    }

    /// Bind the guard registry to one set of parameters.
    pub fn predicates<'a>(&'a self, params: GuardParams<'a, C>) -> BoundGuards<'a, C> {
        BoundGuards {
            guards: &self.guards,
            params,
        }
    }
}

impl<C> Default for Config<C> {
    fn default() -> Self {
        Self {
            guards: HashMap::new(),
            effects: HashMap::new(),
            verbosity: Verbosity::default(),
            console: Rc::new(TracingConsole),
            development: cfg!(debug_assertions),
        }
    }
}

impl<C> Clone for Config<C> {
    fn clone(&self) -> Self {
        Self {
            guards: self.guards.clone(),
            effects: self.effects.clone(),
            verbosity: self.verbosity,
            console: Rc::clone(&self.console),
            development: self.development,
        }
    }
}

impl<C> fmt::Debug for Config<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut guards: Vec<_> = self.guards.keys().collect();
        guards.sort();
        let mut effects: Vec<_> = self.effects.keys().collect();
        effects.sort();

        f.debug_struct("Config")
            .field("guards", &guards)
            .field("effects", &effects)
            .field("verbosity", &self.verbosity)
            .field("development", &self.development)
            .finish()
    }
}

/// Guard registry bound to the event and context of one dispatch.
pub struct BoundGuards<'a, C> {
    guards: &'a HashMap<String, Guard<C>>,
    params: GuardParams<'a, C>,
}

impl<C: Context> Predicates for BoundGuards<'_, C> {
    fn check(&self, name: &str) -> Result<bool, GuardError> {
        self.guards
            .get(name)
            .map(|guard| guard.check(&self.params))
            .ok_or_else(|| GuardError::UndefinedGuard {
                name: name.to_string(),
            })
    }
}
