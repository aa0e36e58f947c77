//! Events and dispatch actions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// An event delivered to a machine: a type string plus an arbitrary payload.
///
/// Serializes to the flat `{ "type": ..., ...payload }` shape.
///
/// # Example
///
/// ```rust
/// use switchyard::core::Event;
///
/// let event = Event::new("FETCH").with("id", 7);
/// assert_eq!(event.kind(), "FETCH");
/// assert_eq!(event.to_string(), r#"{"type":"FETCH","id":7}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl Event {
    /// Type of the synthetic event a machine starts with.
    pub const INIT: &'static str = "$init";

    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Map::new(),
        }
    }

    /// The `$init` event carried by a freshly created state.
    pub fn init() -> Self {
        Self::new(Self::INIT)
    }

    /// Attach a payload field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }
}

impl From<&str> for Event {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for Event {
    fn from(kind: String) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str(&self.kind),
        }
    }
}

/// Replaces the previous context with a new one.
pub type ContextReducer<C> = Box<dyn FnOnce(&C) -> C>;

/// Actions that update a machine state.
pub enum Action<C> {
    /// Deliver an event to the current state.
    Send(Event),

    /// Replace the context, leaving everything else untouched.
    SetContext(ContextReducer<C>),
}

impl<C> Action<C> {
    pub fn send(event: impl Into<Event>) -> Self {
        Action::Send(event.into())
    }

    pub fn set_context<F>(reducer: F) -> Self
    where
        F: FnOnce(&C) -> C + 'static,
    {
        Action::SetContext(Box::new(reducer))
    }
}

impl<C> fmt::Debug for Action<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Send(event) => f.debug_tuple("Send").field(event).finish(),
            Action::SetContext(_) => f.write_str("SetContext(..)"),
        }
    }
}
