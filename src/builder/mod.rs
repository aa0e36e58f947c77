//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders for definitions and
//! configurations, and [`Machine::new`], which checks that the two agree
//! before anything runs. Validation accumulates every problem instead of
//! stopping at the first one.

pub mod config;
pub mod definition;
pub mod error;
pub mod machine;
pub mod macros;

pub use config::ConfigBuilder;
pub use definition::{DefinitionBuilder, StateBuilder};
pub use error::{BuildError, ConfigError};
pub use machine::{validate, Machine};
