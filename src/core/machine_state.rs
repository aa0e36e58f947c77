//! The value a machine is in at one point in time.

use super::event::Event;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Bound for machine context values.
pub trait Context: Clone + Debug + 'static {}

impl<T: Clone + Debug + 'static> Context for T {}

/// Snapshot of a running machine.
///
/// States are never edited in place: every accepted transition produces a
/// new snapshot, and rejected ones hand back an equal copy of the input.
/// `next_events` always lists the event types of the current state's
/// transition table followed by the root-level ones not already present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineState<S, C> {
    /// Current state value
    pub value: S,
    /// User context
    pub context: C,
    /// Event that led to this state
    pub event: Event,
    /// Event types the current state listens to
    pub next_events: Vec<String>,
}

impl<S, C> MachineState<S, C> {
    /// Whether `event_type` has a transition from this state.
    pub fn can(&self, event_type: &str) -> bool {
        self.next_events.iter().any(|e| e == event_type)
    }
}
