//! Core machine types.
//!
//! This module contains the plain data the engine works on:
//! - State values via the `State` trait
//! - Events, dispatch actions and machine snapshots
//! - Definitions (the transition table) and configurations (guard and
//!   effect registries)
//!
//! Nothing in here performs a transition; see [`crate::dispatch`] and
//! [`crate::effects`] for that.

mod config;
mod definition;
mod event;
mod machine_state;
mod state;

pub use config::{BoundGuards, Config, Effect, Guard, GuardParams};
pub use definition::{Definition, StateDef, Target, Transitions};
pub use event::{Action, ContextReducer, Event};
pub use machine_state::{Context, MachineState};
pub use state::State;
