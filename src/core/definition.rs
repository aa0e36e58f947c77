//! Declarative machine definitions.
//!
//! A definition is a static table: the initial state value, one
//! [`StateDef`] per state value, machine-wide fallback transitions and the
//! initial context. It is built once and shared read-only by every
//! dispatch and effect run.

use super::state::State;
use crate::guard::GuardExpr;
use std::collections::HashMap;

/// Where an event leads.
#[derive(Clone, Debug, PartialEq)]
pub enum Target<S> {
    /// Unconditional transition.
    To(S),

    /// Transition taken only when the guard holds.
    Guarded { target: S, guard: Option<GuardExpr> },
}

impl<S> Target<S> {
    pub fn target(&self) -> &S {
        match self {
            Target::To(target) | Target::Guarded { target, .. } => target,
        }
    }

    pub fn guard(&self) -> Option<&GuardExpr> {
        match self {
            Target::To(_) => None,
            Target::Guarded { guard, .. } => guard.as_ref(),
        }
    }
}

/// Event type to target mapping that keeps insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct Transitions<S> {
    entries: Vec<(String, Target<S>)>,
}

impl<S> Default for Transitions<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S> Transitions<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a transition. Re-inserting an event type replaces the target
    /// but keeps the original position.
    pub fn insert(&mut self, event: impl Into<String>, target: Target<S>) {
        let event = event.into();
        match self.entries.iter_mut().find(|(key, _)| *key == event) {
            Some((_, slot)) => *slot = target,
            None => self.entries.push((event, target)),
        }
    }

    pub fn get(&self, event: &str) -> Option<&Target<S>> {
        self.entries
            .iter()
            .find(|(key, _)| key == event)
            .map(|(_, target)| target)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Target<S>)> + '_ {
        self.entries
            .iter()
            .map(|(key, target)| (key.as_str(), target))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Transitions and entry effects of a single state.
#[derive(Clone, Debug, PartialEq)]
pub struct StateDef<S> {
    pub on: Transitions<S>,
    /// Effect names run, in order, on entry.
    pub effects: Vec<String>,
}

impl<S> Default for StateDef<S> {
    fn default() -> Self {
        Self {
            on: Transitions::new(),
            effects: Vec::new(),
        }
    }
}

/// A complete machine definition.
#[derive(Clone, Debug)]
pub struct Definition<S: State, C> {
    pub initial: S,
    pub states: HashMap<S, StateDef<S>>,
    /// Fallback transitions consulted when the current state has none.
    pub on: Transitions<S>,
    pub context: C,
}

impl<S: State, C> Definition<S, C> {
    pub fn state(&self, value: &S) -> Option<&StateDef<S>> {
        self.states.get(value)
    }

    /// Look up the transition for `event` from `value`, falling back to the
    /// root-level table.
    pub fn transition(&self, value: &S, event: &str) -> Option<&Target<S>> {
        self.states
            .get(value)
            .and_then(|state| state.on.get(event))
            .or_else(|| self.on.get(event))
    }

    /// Event types available in `value`: its own keys first, then root keys
    /// not already listed.
    pub fn next_events(&self, value: &S) -> Vec<String> {
        let mut events: Vec<String> = self
            .states
            .get(value)
            .map(|state| state.on.keys().map(str::to_owned).collect())
            .unwrap_or_default();

        for key in self.on.keys() {
            if !events.iter().any(|e| e == key) {
                events.push(key.to_owned());
            }
        }

        events
    }
}
