//! Soft failures reported through the console instead of returned.

use super::Level;
use thiserror::Error;

/// Everything the engine reports without failing the call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("State '{state}' not defined.")]
    UndefinedState { state: String },

    #[error("Current state '{state}' doesn't listen to event type '{event}'.")]
    UnknownEvent { state: String, event: String },

    #[error("Transition from '{from}' to '{to}' denied by guard.")]
    GuardDenied { from: String, to: String },

    #[error("The guard function '{name}' is not defined in the configuration.")]
    UndefinedGuard { name: String },

    #[error(
        "Guard results differ between traced and production evaluation. \
         This is a bug in the guard tracer."
    )]
    TracerDivergence,

    #[error("Context updated.")]
    ContextUpdated,

    #[error("Effect '{effect}' not defined for state '{state}'.")]
    UndefinedEffect { effect: String, state: String },

    #[error("Send function not available. Must be used synchronously within an effect.")]
    SendLocked,

    #[error("Set context function not available. Must be used synchronously within an effect.")]
    SetContextLocked,

    #[error("Cannot dispatch an action to the state machine after it is unmounted.")]
    Unmounted,
}

impl Diagnostic {
    pub fn level(&self) -> Level {
        match self {
            Diagnostic::UnknownEvent { .. }
            | Diagnostic::GuardDenied { .. }
            | Diagnostic::ContextUpdated => Level::Debug,
            _ => Level::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_rejections_are_debug_level() {
        let unknown = Diagnostic::UnknownEvent {
            state: "idle".to_string(),
            event: "RESOLVE".to_string(),
        };
        assert_eq!(unknown.level(), Level::Debug);
        assert_eq!(
            unknown.to_string(),
            "Current state 'idle' doesn't listen to event type 'RESOLVE'."
        );
    }

    #[test]
    fn misuse_and_bugs_are_error_level() {
        assert_eq!(Diagnostic::SendLocked.level(), Level::Error);
        assert_eq!(Diagnostic::TracerDivergence.level(), Level::Error);
        assert_eq!(Diagnostic::Unmounted.level(), Level::Error);
    }
}
