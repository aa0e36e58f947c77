//! Fluent construction of machine definitions.

use crate::core::{Definition, State, StateDef, Target, Transitions};
use crate::guard::GuardExpr;
use std::collections::HashMap;

/// Builder for a single state: its transitions and entry effects.
pub struct StateBuilder<S> {
    def: StateDef<S>,
}

impl<S: State> StateBuilder<S> {
    fn new() -> Self {
        Self {
            def: StateDef::default(),
        }
    }

    /// Unconditional transition.
    pub fn on(mut self, event: impl Into<String>, target: impl Into<S>) -> Self {
        self.def.on.insert(event, Target::To(target.into()));
        self
    }

    /// Transition taken only when `guard` holds.
    pub fn on_guarded(
        mut self,
        event: impl Into<String>,
        target: impl Into<S>,
        guard: impl Into<GuardExpr>,
    ) -> Self {
        self.def.on.insert(event, guarded(target.into(), guard.into()));
        self
    }

    pub fn transition(mut self, event: impl Into<String>, target: Target<S>) -> Self {
        self.def.on.insert(event, target);
        self
    }

    /// Append an entry effect. Effects run in the order they are added.
    pub fn effect(mut self, name: impl Into<String>) -> Self {
        self.def.effects.push(name.into());
        self
    }

    pub fn effects<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.def.effects.extend(names.into_iter().map(Into::into));
        self
    }

    fn build(self) -> StateDef<S> {
        self.def
    }
}

fn guarded<S>(target: S, guard: GuardExpr) -> Target<S> {
    Target::Guarded {
        target,
        guard: Some(guard),
    }
}

/// Builder for a [`Definition`].
///
/// # Example
///
/// ```rust
/// use switchyard::core::Definition;
/// use switchyard::guard::not;
///
/// let definition: Definition<String, u32> = Definition::builder("idle")
///     .state("idle", |s| s.on("FETCH", "loading"))
///     .state("loading", |s| {
///         s.on("RESOLVE", "idle")
///             .on_guarded("RETRY", "loading", not("isExhausted"))
///             .effect("onLoading")
///     })
///     .on("RESET", "idle")
///     .context(3)
///     .build();
///
/// assert_eq!(definition.next_events(&"loading".to_string()), ["RESOLVE", "RETRY", "RESET"]);
/// ```
pub struct DefinitionBuilder<S: State, C> {
    initial: S,
    states: HashMap<S, StateDef<S>>,
    on: Transitions<S>,
    context: C,
}

impl<S: State, C> DefinitionBuilder<S, C> {
    pub fn new(initial: impl Into<S>, context: C) -> Self {
        Self {
            initial: initial.into(),
            states: HashMap::new(),
            on: Transitions::new(),
            context,
        }
    }

    /// Define a state. Defining the same value twice replaces the first.
    pub fn state<F>(mut self, value: impl Into<S>, build: F) -> Self
    where
        F: FnOnce(StateBuilder<S>) -> StateBuilder<S>,
    {
        self.states
            .insert(value.into(), build(StateBuilder::new()).build());
        self
    }

    /// Root-level transition, used when the current state has none for
    /// `event`.
    pub fn on(mut self, event: impl Into<String>, target: impl Into<S>) -> Self {
        self.on.insert(event, Target::To(target.into()));
        self
    }

    pub fn on_guarded(
        mut self,
        event: impl Into<String>,
        target: impl Into<S>,
        guard: impl Into<GuardExpr>,
    ) -> Self {
        self.on.insert(event, guarded(target.into(), guard.into()));
        self
    }

    pub fn context(mut self, context: C) -> Self {
        self.context = context;
        self
    }

    pub fn build(self) -> Definition<S, C> {
        Definition {
            initial: self.initial,
            states: self.states,
            on: self.on,
            context: self.context,
        }
    }
}

impl<S: State, C: Default> Definition<S, C> {
    /// Start a definition with a default context.
    pub fn builder(initial: impl Into<S>) -> DefinitionBuilder<S, C> {
        DefinitionBuilder::new(initial, C::default())
    }
}
