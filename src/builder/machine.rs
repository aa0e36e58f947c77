//! Validated pairing of a definition with its configuration.

use crate::builder::error::{BuildError, ConfigError};
use crate::core::{Action, Config, Context, Definition, MachineState, State, Transitions};
use crate::dispatch::{apply_dispatch, create_initial_state, step, Outcome};
use crate::effects::{apply_effect, Dispatch, EffectCleanup, MountFlag, SharedMachine, SyncedMachine};
use std::fmt;
use std::rc::Rc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<ConfigError>>;

/// A definition and configuration that agree with each other.
///
/// Every state, guard and effect the definition names is known, so
/// dispatches never hit a missing lookup. Cloning is cheap; clones share the
/// same definition and configuration.
pub struct Machine<S: State, C: Context> {
    definition: Rc<Definition<S, C>>,
    config: Rc<Config<C>>,
}

impl<S: State, C: Context> Machine<S, C> {
    /// Validate and pair `definition` with `config`, reporting every
    /// unresolved reference at once.
    pub fn new(definition: Definition<S, C>, config: Config<C>) -> Result<Self, BuildError> {
        match validate(&definition, &config) {
            Validation::Success(_) => Ok(Self {
                definition: Rc::new(definition),
                config: Rc::new(config),
            }),
            Validation::Failure(errors) => Err(BuildError::InvalidMachine(
                errors.iter().cloned().collect(),
            )),
        }
    }

    pub fn definition(&self) -> &Definition<S, C> {
        &self.definition
    }

    pub fn config(&self) -> &Config<C> {
        &self.config
    }

    pub fn initial_state(&self) -> MachineState<S, C> {
        create_initial_state(&self.definition)
    }

    /// Apply one action, returning the next state.
    pub fn transition(&self, state: &MachineState<S, C>, action: Action<C>) -> MachineState<S, C> {
        apply_dispatch(&self.definition, &self.config, state, action)
    }

    pub fn step(&self, state: &MachineState<S, C>, action: Action<C>) -> Outcome<S, C> {
        step(&self.definition, &self.config, state, action)
    }

    /// Run the entry effects of `state` outside sync mode.
    pub fn enter(
        &self,
        state: &MachineState<S, C>,
        dispatch: Dispatch<C>,
        mounted: &MountFlag,
    ) -> Option<EffectCleanup<C>> {
        apply_effect(&self.definition, &self.config, state, dispatch, mounted, false)
    }

    pub fn into_synced(self) -> SyncedMachine<S, C> {
        SyncedMachine::new(self)
    }

    pub fn into_shared(self) -> SharedMachine<S, C> {
        SharedMachine::new(self)
    }
}

impl<S: State, C: Context> Clone for Machine<S, C> {
    fn clone(&self) -> Self {
        Self {
            definition: Rc::clone(&self.definition),
            config: Rc::clone(&self.config),
        }
    }
}

impl<S: State, C: Context> fmt::Debug for Machine<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("definition", &self.definition)
            .field("config", &self.config)
            .finish()
    }
}

/// Check every reference in `definition` against itself and `config`.
///
/// States are visited in name order so errors come out in a stable order;
/// root transitions are checked last.
pub fn validate<S: State, C>(definition: &Definition<S, C>, config: &Config<C>) -> Check {
    let mut checks = vec![check_initial(definition)];

    let mut states: Vec<_> = definition.states.iter().collect();
    states.sort_by(|(a, _), (b, _)| a.name().cmp(b.name()));

    for (value, state) in states {
        let from = Some(value.name().to_string());
        checks.extend(check_transitions(definition, config, &from, &state.on));
        checks.extend(
            state
                .effects
                .iter()
                .map(|name| check_effect(config, name, value)),
        );
    }
    checks.extend(check_transitions(definition, config, &None, &definition.on));

    Validation::all_vec(checks).map(|_| ())
}

fn check_initial<S: State, C>(definition: &Definition<S, C>) -> Check {
    if definition.state(&definition.initial).is_some() {
        Validation::success(())
    } else {
        Validation::fail(ConfigError::UndefinedInitialState {
            state: definition.initial.name().to_string(),
        })
    }
}

fn check_transitions<S: State, C>(
    definition: &Definition<S, C>,
    config: &Config<C>,
    from: &Option<String>,
    transitions: &Transitions<S>,
) -> Vec<Check> {
    let mut checks = Vec::new();

    for (event, target) in transitions.iter() {
        if definition.state(target.target()).is_none() {
            checks.push(Validation::fail(ConfigError::UndefinedTarget {
                from: from.clone(),
                event: event.to_string(),
                target: target.target().name().to_string(),
            }));
        }

        let names = target.guard().map(|g| g.names()).unwrap_or_default();
        let mut seen: Vec<&str> = Vec::new();
        for name in names {
            if seen.contains(&name) || config.guard(name).is_some() {
                continue;
            }
            seen.push(name);
            checks.push(Validation::fail(ConfigError::UndefinedGuard {
                name: name.to_string(),
                from: from.clone(),
                event: event.to_string(),
            }));
        }
    }

    checks
}

fn check_effect<S: State, C>(config: &Config<C>, name: &str, state: &S) -> Check {
    if config.effect(name).is_some() {
        Validation::success(())
    } else {
        Validation::fail(ConfigError::UndefinedEffect {
            name: name.to_string(),
            state: state.name().to_string(),
        })
    }
}
