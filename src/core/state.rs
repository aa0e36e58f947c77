//! State values of a machine definition.
//!
//! A definition is keyed by state values. Any value that can be hashed,
//! compared and serialized can act as one; strings are the common case and
//! `state_enum!` covers fieldless enums.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state values.
///
/// State values are opaque to the engine: it only compares, hashes and
/// clones them, and uses `name()` when rendering diagnostics.
///
/// # Example
///
/// ```rust
/// use switchyard::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Light {
///     Red,
///     Green,
/// }
///
/// impl State for Light {
///     fn name(&self) -> &str {
///         match self {
///             Self::Red => "Red",
///             Self::Green => "Green",
///         }
///     }
/// }
///
/// assert_eq!(Light::Green.name(), "Green");
/// assert_eq!("idle".to_string().name(), "idle");
/// ```
pub trait State: Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + 'static {
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}

impl State for String {
    fn name(&self) -> &str {
        self
    }
}
