//! Guard evaluation errors.

use thiserror::Error;

/// Errors that can occur while evaluating a guard expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("Guard '{name}' is not defined in the configuration")]
    UndefinedGuard { name: String },
}
