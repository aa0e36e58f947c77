//! Errors raised while assembling a machine.

use thiserror::Error;

/// A reference in the definition that the definition or configuration
/// cannot resolve.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Initial state '{state}' is not defined.")]
    UndefinedInitialState { state: String },

    #[error("Event '{event}' in {} targets undefined state '{target}'.", scope(.from))]
    UndefinedTarget {
        from: Option<String>,
        event: String,
        target: String,
    },

    #[error("Guard '{name}' used by event '{event}' in {} is not configured.", scope(.from))]
    UndefinedGuard {
        name: String,
        from: Option<String>,
        event: String,
    },

    #[error("Effect '{name}' of state '{state}' is not configured.")]
    UndefinedEffect { name: String, state: String },
}

fn scope(from: &Option<String>) -> String {
    match from {
        Some(state) => format!("state '{state}'"),
        None => "the root transitions".to_string(),
    }
}

/// Errors returned when building a machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid machine: {}", summary(.0))]
    InvalidMachine(Vec<ConfigError>),
}

impl BuildError {
    pub fn errors(&self) -> &[ConfigError] {
        match self {
            BuildError::InvalidMachine(errors) => errors,
        }
    }
}

fn summary(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
